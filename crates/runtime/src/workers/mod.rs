//! Worker tasks that back the runtime orchestration.
//!
//! The tick worker owns the engine's main line: it advances the clock on a
//! fixed interval and applies client commands between ticks.

mod tick;

pub use tick::{Command, TickWorker};
