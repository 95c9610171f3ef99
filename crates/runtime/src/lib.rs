//! Runtime orchestration for the ability framework.
//!
//! This crate wires the pure rules of `ability-core` into a working engine:
//! a concurrent registry, the cast pipeline, the deferred-effect service, a
//! tick scheduler and telemetry. Hosts embed [`AbilityEngine`] directly on
//! their main loop, or start a [`Runtime`] and talk to it through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the initialize-once wiring and the synchronous API
//! - [`runtime`] hosts the async orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`registry`], [`pipeline`] and [`deferred`] implement the framework
//! - [`events`] and [`telemetry`] report what happened
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod deferred;
pub mod engine;
pub mod events;
pub mod pipeline;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod telemetry;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use deferred::{Arena, ArenaFull, DeferredEffectHandle, ImpactOutcome, ProjectileService};
pub use engine::{AbilityEngine, AbilityEngineBuilder};
pub use events::{CastEvent, EffectEvent, Event, EventBus, RegistryEvent, Topic};
pub use pipeline::{CastOutcome, CastPipeline, CastState, FAULT_MESSAGE, Rejection};
pub use registry::{
    AbilityQuery, AbilityRegistry, AbilitySummary, Catalog, CatalogCache, ReloadReport,
    SortField, SortOrder,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scheduler::{TickClock, TickScheduler};
pub use telemetry::{CastMetrics, LogExporter, MetricsSnapshot, Telemetry};
