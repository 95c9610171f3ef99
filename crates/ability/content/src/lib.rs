//! Standard ability content, configuration loaders and an in-memory host.
//!
//! This crate sits on the content side of the framework contract:
//! - Standard abilities built against [`ability_core::AbilityBehavior`]
//!   (fireball, homing missile, lightning bolt, heal, blizzard)
//! - Configuration loaders turning TOML files into
//!   [`ability_core::ConfigSection`] trees (feature `loaders`)
//! - A sandbox host implementing the actor, world and effect traits
//!   (feature `sandbox`)
//!
//! Nothing here is required by the runtime; hosts pick what they need.

pub mod abilities;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "sandbox")]
pub mod sandbox;

pub use abilities::standard_abilities;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult};

#[cfg(feature = "sandbox")]
pub use sandbox::{Collision, EffectRecord, SandboxHost};
