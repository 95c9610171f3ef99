//! Traits describing the host environment.
//!
//! The framework never models actors, world objects, rendering or timing
//! itself. The host hands it implementations of these traits once at
//! startup and the framework only talks to the world through them:
//!
//! - [`ActorSource`]: level, resources and atomic cost deduction per actor
//! - [`WorldHost`]: spawned-object bookkeeping and living-entity queries
//! - [`EffectSink`]: opaque particle/sound/damage/message primitives
//! - [`Scheduler`]: one-shot, repeating and background callbacks
//! - [`TelemetrySink`]: fire-and-forget cast metrics
//! - [`ProjectileLauncher`]: the deferred-effect entrypoint handed to abilities
use std::sync::Arc;

mod actors;
mod effects;
mod launcher;
mod scheduler;
mod telemetry;
mod world;

pub use actors::ActorSource;
pub use effects::EffectSink;
pub use launcher::{HitSound, HomingSpec, LaunchRequest, ProjectileLauncher};
pub use scheduler::{OnceTask, RepeatingTask, Scheduler, TaskControl, TaskHandle};
pub use telemetry::TelemetrySink;
pub use world::{LivingEntity, ObjectHandle, WorldHost};

/// Host collaborators shared by the pipeline, the deferred-effect service and
/// behaviors that schedule follow-up work.
///
/// Built once by the hosting application at startup and passed by reference.
#[derive(Clone)]
pub struct HostServices {
    pub actors: Arc<dyn ActorSource>,
    pub world: Arc<dyn WorldHost>,
    pub effects: Arc<dyn EffectSink>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl HostServices {
    pub fn new(
        actors: Arc<dyn ActorSource>,
        world: Arc<dyn WorldHost>,
        effects: Arc<dyn EffectSink>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            actors,
            world,
            effects,
            scheduler,
        }
    }
}
