//! Topic-based event bus for runtime events.
//!
//! Casts, deferred effects and catalog changes are published to separate
//! topics; consumers subscribe only to the topics they need. Publishing is
//! best-effort and never blocks a cast.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CastEvent, EffectEvent, RegistryEvent};
