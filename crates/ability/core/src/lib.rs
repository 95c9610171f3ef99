//! Ability domain types and pure rules shared by the runtime and content.
//!
//! `ability-core` defines what an ability is (builder → immutable
//! definition + compute capability), when an actor may cast it (prerequisite
//! chain, cooldown tracker) and the traits through which the framework talks
//! to its host (actors, world objects, effects, scheduling, telemetry). It
//! performs no I/O and owns no threads; orchestration lives in
//! `ability-runtime`.
pub mod ability;
pub mod config;
pub mod cooldown;
pub mod env;
pub mod error;
pub mod prereq;
pub mod types;

pub use ability::{
    AbilityBehavior, AbilityBuilder, AbilityDefinition, AbilityFlags, AbilityId, AbilityInstance,
    AbilityKind, CastContext, Computed, ImpactContext, ResolvedTarget, TargetContext, fold_case,
};
pub use config::{ConfigReader, ConfigSection, ConfigTable, ConfigValue, FrameworkConfig};
pub use cooldown::{CooldownRecord, CooldownTracker};
pub use env::{
    ActorSource, EffectSink, HitSound, HomingSpec, HostServices, LaunchRequest, LivingEntity,
    ObjectHandle, OnceTask, ProjectileLauncher, RepeatingTask, Scheduler, TaskControl,
    TaskHandle, TelemetrySink, WorldHost,
};
pub use error::{
    AbilityError, BuildError, ComputeError, ConfigError, DeductionError, ErrorSeverity,
    LaunchError,
};
pub use prereq::{
    CheckContext, CompositeCheck, CooldownCheck, LevelCheck, NoneCheck, Prerequisite,
    PrerequisiteResult, ResourceCheck,
};
pub use types::{ActorId, ResourceCost, ResourceKind, TICK_MILLIS, Tick, Vec3};
