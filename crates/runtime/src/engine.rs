//! Synchronous ability engine: the initialize-once wiring of every component.
//!
//! [`AbilityEngine::builder`] is the single startup step. It receives the
//! host collaborators, owns the tick scheduler, registers the ability set
//! against the loaded configuration and hands shared handles to the
//! pipeline and the deferred-effect service. Nothing is installed through
//! global state, so several engines can coexist and [`AbilityEngine::shutdown`]
//! tears everything down deterministically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use ability_core::{
    AbilityBuilder, AbilityId, ActorId, ActorSource, BuildError, ConfigSection, CooldownTracker,
    EffectSink, FrameworkConfig, HostServices, ObjectHandle, Scheduler, TargetContext,
    TaskControl, TelemetrySink, Tick, WorldHost,
};
use tracing::{debug, info, trace, warn};

use crate::api::{Result, RuntimeError};
use crate::deferred::{ImpactOutcome, ProjectileService};
use crate::events::{CastEvent, EffectEvent, Event, EventBus, RegistryEvent};
use crate::pipeline::{CastOutcome, CastPipeline};
use crate::registry::{AbilityQuery, AbilityRegistry, AbilitySummary, ReloadReport};
use crate::scheduler::{TickClock, TickScheduler};
use crate::telemetry::{CastMetrics, Telemetry};

/// Fully wired ability framework bound to one host.
pub struct AbilityEngine {
    registry: Arc<AbilityRegistry>,
    cooldowns: Arc<CooldownTracker>,
    scheduler: Arc<TickScheduler>,
    services: HostServices,
    projectiles: Arc<ProjectileService>,
    pipeline: CastPipeline,
    telemetry: Telemetry,
    event_bus: EventBus,
    config: RwLock<ConfigSection>,
    framework: FrameworkConfig,
    shut_down: AtomicBool,
}

impl AbilityEngine {
    pub fn builder() -> AbilityEngineBuilder {
        AbilityEngineBuilder::default()
    }

    // ========================================================================
    // Casting
    // ========================================================================

    /// Runs one cast through the pipeline and publishes its outcome.
    pub fn cast(&self, actor: ActorId, ability: &str, target: TargetContext) -> CastOutcome {
        let outcome = self.pipeline.cast(actor, ability, target);
        let tick = self.now();

        let event = match &outcome {
            CastOutcome::Rejected(rejection) => CastEvent::Rejected {
                actor,
                ability: ability.to_owned(),
                reason: rejection.user_message(),
                tick,
            },
            CastOutcome::Faulted { ability, error } => CastEvent::Faulted {
                actor,
                ability: ability.clone(),
                error: error.to_string(),
                tick,
            },
            CastOutcome::Applied { ability }
            | CastOutcome::Deferred { ability, .. }
            | CastOutcome::Channeling { ability, .. } => CastEvent::Succeeded {
                actor,
                ability: ability.clone(),
                state: outcome.state(),
                tick,
            },
        };
        self.event_bus.publish(Event::Cast(event));

        if let CastOutcome::Deferred { ability, handle } = &outcome {
            self.event_bus.publish(Event::Effect(EffectEvent::Launched {
                owner: actor,
                ability: ability.clone(),
                object: *handle,
                tick,
            }));
        }
        outcome
    }

    /// Host collision callback for a tracked object.
    ///
    /// Safe to call any number of times for the same handle; only the first
    /// call applies the impact.
    pub fn resolve_impact(&self, handle: ObjectHandle, hit: Option<ActorId>) -> ImpactOutcome {
        let outcome = self.projectiles.resolve_impact(handle, hit);
        let tick = self.now();
        let event = match &outcome {
            ImpactOutcome::Resolved {
                ability,
                attributed,
            } => EffectEvent::ImpactResolved {
                ability: ability.clone(),
                object: handle,
                attributed: *attributed,
                tick,
            },
            _ => EffectEvent::ImpactIgnored {
                object: handle,
                tick,
            },
        };
        self.event_bus.publish(Event::Effect(event));
        outcome
    }

    // ========================================================================
    // Time
    // ========================================================================

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    /// Advances the host clock by `ticks`, running every task that comes due.
    /// Returns the number of task executions.
    pub fn advance(&self, ticks: u64) -> usize {
        self.scheduler.advance(ticks)
    }

    /// Advances by whole ticks covering `millis`.
    pub fn advance_millis(&self, millis: u64) -> usize {
        self.advance(Tick::ticks_for_millis(millis))
    }

    pub fn advance_by(&self, duration: Duration) -> usize {
        self.advance(Tick::ticks_for(duration))
    }

    pub fn clock(&self) -> TickClock {
        self.scheduler.clock()
    }

    // ========================================================================
    // Actors
    // ========================================================================

    /// Purges every cooldown record of a departing actor.
    ///
    /// Projectiles already in flight stay tracked and resolve without
    /// owner attribution.
    pub fn on_disconnect(&self, actor: ActorId) -> usize {
        let cleared = self.cooldowns.clear_all(actor);
        debug!(
            target: "runtime::engine",
            actor = %actor,
            cleared,
            in_flight = self.projectiles.owned_by(actor).len(),
            "Actor disconnected"
        );
        cleared
    }

    /// Remaining cooldown of `ability` for `actor`, in milliseconds.
    pub fn remaining_cooldown(&self, actor: ActorId, ability: &str) -> u64 {
        self.cooldowns
            .remaining_millis(actor, &AbilityId::new(ability), self.now())
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Registers `builder` against the current configuration.
    ///
    /// Returns `Ok(false)` when the id is already taken. Abilities added here
    /// are not part of the compiled set and do not survive [`reload`](Self::reload).
    pub fn register(&self, builder: AbilityBuilder) -> std::result::Result<bool, BuildError> {
        let inserted = {
            let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
            self.registry.register_builder(&builder, &*config)?
        };
        if inserted {
            self.event_bus
                .publish(Event::Registry(RegistryEvent::Registered {
                    ability: AbilityId::new(builder.id()),
                }));
        }
        Ok(inserted)
    }

    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.registry.unregister(id);
        if removed {
            self.event_bus
                .publish(Event::Registry(RegistryEvent::Unregistered {
                    ability: AbilityId::new(id),
                }));
        }
        removed
    }

    /// Rebuilds the catalog from the compiled abilities and the current
    /// configuration. Unregistered compiled abilities come back.
    ///
    /// The catalog swap is atomic; derived indices are warmed in the
    /// background afterwards.
    pub fn reload(&self) -> ReloadReport {
        let report = {
            let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
            self.registry.reload(&*config)
        };

        let registry = Arc::clone(&self.registry);
        self.services
            .scheduler
            .run_async(Box::new(move || registry.warm_caches()));

        if report.defaulted.is_empty() {
            info!(
                target: "runtime::engine",
                total = report.total,
                "Abilities reloaded"
            );
        } else {
            warn!(
                target: "runtime::engine",
                total = report.total,
                defaulted = report.defaulted.len(),
                "Abilities reloaded with fallback definitions"
            );
        }
        self.event_bus
            .publish(Event::Registry(RegistryEvent::Reloaded {
                total: report.total,
                defaulted: report.defaulted.clone(),
            }));
        report
    }

    /// Replaces the configuration used by later registrations and reloads.
    ///
    /// The `framework` section is read once at build time and is not
    /// re-applied here.
    pub fn set_config(&self, config: ConfigSection) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn config(&self) -> ConfigSection {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn query(&self, query: &AbilityQuery) -> Vec<AbilitySummary> {
        self.registry
            .query(query)
            .iter()
            .map(|instance| AbilitySummary::from(instance.as_ref()))
            .collect()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn registry(&self) -> &Arc<AbilityRegistry> {
        &self.registry
    }

    pub fn cooldowns(&self) -> &Arc<CooldownTracker> {
        &self.cooldowns
    }

    pub fn metrics(&self) -> Arc<CastMetrics> {
        self.telemetry.metrics()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn framework_config(&self) -> &FrameworkConfig {
        &self.framework
    }

    pub fn active_projectiles(&self) -> usize {
        self.projectiles.active_count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Cancels all scheduled work, removes tracked objects, then clears the
    /// registry and every cooldown. Idempotent.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let cancelled = self.scheduler.cancel_all();
        let removed = self.projectiles.shutdown();
        self.registry.clear();
        self.cooldowns.reset();
        self.event_bus
            .publish(Event::Registry(RegistryEvent::Cleared));

        info!(
            target: "runtime::engine",
            cancelled,
            removed,
            "Ability engine shut down"
        );
    }
}

impl std::fmt::Debug for AbilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityEngine")
            .field("now", &self.now())
            .field("abilities", &self.registry.count())
            .field("cooldowns", &self.cooldowns.len())
            .field("projectiles", &self.projectiles.active_count())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Builder for [`AbilityEngine`].
#[derive(Default)]
pub struct AbilityEngineBuilder {
    actors: Option<Arc<dyn ActorSource>>,
    world: Option<Arc<dyn WorldHost>>,
    effects: Option<Arc<dyn EffectSink>>,
    config: ConfigSection,
    abilities: Vec<AbilityBuilder>,
    exporters: Vec<Arc<dyn TelemetrySink>>,
    event_bus: Option<EventBus>,
}

impl AbilityEngineBuilder {
    pub fn actors(mut self, actors: Arc<dyn ActorSource>) -> Self {
        self.actors = Some(actors);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldHost>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn effects(mut self, effects: Arc<dyn EffectSink>) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Uses one object as actor source, world and effect sink.
    pub fn host<H>(self, host: Arc<H>) -> Self
    where
        H: ActorSource + WorldHost + EffectSink + 'static,
    {
        self.actors(host.clone()).world(host.clone()).effects(host)
    }

    /// Configuration tree: `framework` tunables and `abilities.<id>` overrides.
    pub fn config(mut self, config: ConfigSection) -> Self {
        self.config = config;
        self
    }

    pub fn ability(mut self, builder: AbilityBuilder) -> Self {
        self.abilities.push(builder);
        self
    }

    pub fn abilities(mut self, builders: impl IntoIterator<Item = AbilityBuilder>) -> Self {
        self.abilities.extend(builders);
        self
    }

    /// Adds an external telemetry exporter.
    pub fn exporter(mut self, exporter: Arc<dyn TelemetrySink>) -> Self {
        self.exporters.push(exporter);
        self
    }

    /// Publishes engine events on an existing bus instead of a fresh one.
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<AbilityEngine> {
        let actors = self.actors.ok_or(RuntimeError::MissingHost("actor source"))?;
        let world = self.world.ok_or(RuntimeError::MissingHost("world host"))?;
        let effects = self.effects.ok_or(RuntimeError::MissingHost("effect sink"))?;

        let framework = FrameworkConfig::from_reader(&self.config);
        let scheduler = Arc::new(TickScheduler::new());
        let services = HostServices::new(
            actors,
            world,
            effects,
            Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        );

        let registry = Arc::new(AbilityRegistry::new());
        for builder in &self.abilities {
            let inserted = registry
                .register_compiled(builder, &self.config)
                .map_err(|source| RuntimeError::InvalidAbility {
                    ability: builder.id().to_owned(),
                    source,
                })?;
            if !inserted {
                warn!(
                    target: "runtime::engine",
                    ability = builder.id(),
                    "Duplicate ability id, keeping the first registration"
                );
            }
        }

        let telemetry = self
            .exporters
            .into_iter()
            .fold(Telemetry::new(), Telemetry::with_exporter);
        let sink: Arc<dyn TelemetrySink> = Arc::new(telemetry.clone());

        let cooldowns = Arc::new(CooldownTracker::new());
        let projectiles = Arc::new(ProjectileService::new(
            services.clone(),
            Arc::clone(&registry),
            Arc::clone(&sink),
            framework.clone(),
        ));
        let pipeline = CastPipeline::new(
            Arc::clone(&registry),
            Arc::clone(&cooldowns),
            services.clone(),
            projectiles.clone(),
            sink,
        );

        schedule_cooldown_sweep(&scheduler, &cooldowns, framework.cooldown_sweep_interval);

        info!(
            target: "runtime::engine",
            abilities = registry.count(),
            exporters = telemetry.exporter_count(),
            "Ability engine initialized"
        );

        Ok(AbilityEngine {
            registry,
            cooldowns,
            scheduler,
            services,
            projectiles,
            pipeline,
            telemetry,
            event_bus: self.event_bus.unwrap_or_default(),
            config: RwLock::new(self.config),
            framework,
            shut_down: AtomicBool::new(false),
        })
    }
}

/// Periodically drops expired cooldown records.
fn schedule_cooldown_sweep(
    scheduler: &TickScheduler,
    cooldowns: &Arc<CooldownTracker>,
    interval: u64,
) {
    let interval = interval.max(1);
    let clock = scheduler.clock();
    let cooldowns = Arc::clone(cooldowns);
    scheduler.run_repeating(
        interval,
        interval,
        Box::new(move || {
            let swept = cooldowns.sweep_expired(clock.now());
            if swept > 0 {
                trace!(target: "runtime::engine", swept, "Expired cooldowns swept");
            }
            TaskControl::Continue
        }),
    );
}

#[cfg(test)]
mod tests {
    use ability_content::SandboxHost;
    use ability_core::{AbilityBehavior, AbilityKind, CastContext, ComputeError, Computed, Vec3};

    use super::*;
    use crate::events::Topic;

    struct Inert;

    impl AbilityBehavior for Inert {
        fn kind(&self) -> AbilityKind {
            AbilityKind::Instant
        }

        fn compute(&self, _ctx: &mut CastContext<'_>) -> std::result::Result<Computed, ComputeError> {
            Ok(Computed::Applied)
        }
    }

    fn engine(host: Arc<SandboxHost>) -> AbilityEngine {
        match AbilityEngine::builder()
            .host(host)
            .ability(AbilityBuilder::new("blink", Inert).cooldown_ms(1000))
            .build()
        {
            Ok(engine) => engine,
            Err(error) => panic!("engine must build: {error}"),
        }
    }

    #[test]
    fn build_requires_every_host_collaborator() {
        let host = Arc::new(SandboxHost::new());
        let result = AbilityEngine::builder().actors(host).build();
        assert!(matches!(result, Err(RuntimeError::MissingHost("world host"))));
    }

    #[test]
    fn cooldown_sweep_runs_on_schedule() {
        let host = Arc::new(SandboxHost::new());
        host.add_player(ActorId(1), 1, Vec3::ZERO);
        let engine = engine(host);

        assert!(engine.cast(ActorId(1), "blink", TargetContext::none()).is_success());
        assert_eq!(engine.cooldowns().len(), 1);

        engine.advance(FrameworkConfig::DEFAULT_COOLDOWN_SWEEP_INTERVAL);
        assert_eq!(engine.cooldowns().len(), 0);
    }

    #[test]
    fn disconnect_purges_cooldowns() {
        let host = Arc::new(SandboxHost::new());
        host.add_player(ActorId(1), 1, Vec3::ZERO);
        let engine = engine(host);

        engine.cast(ActorId(1), "blink", TargetContext::none());
        assert!(engine.remaining_cooldown(ActorId(1), "blink") > 0);

        assert_eq!(engine.on_disconnect(ActorId(1)), 1);
        assert_eq!(engine.remaining_cooldown(ActorId(1), "blink"), 0);
    }

    #[test]
    fn cast_outcomes_are_published() {
        let host = Arc::new(SandboxHost::new());
        host.add_player(ActorId(1), 1, Vec3::ZERO);
        let engine = engine(host);
        let mut rx = engine.event_bus().subscribe(Topic::Cast);

        engine.cast(ActorId(1), "nope", TargetContext::none());

        match rx.try_recv() {
            Ok(Event::Cast(CastEvent::Rejected { ability, reason, .. })) => {
                assert_eq!(ability, "nope");
                assert_eq!(reason, "Unknown ability: nope");
            }
            other => panic!("expected a rejection event, got {other:?}"),
        }
    }

    #[test]
    fn shutdown_is_idempotent() {
        let host = Arc::new(SandboxHost::new());
        let engine = engine(host);

        engine.shutdown();
        engine.shutdown();

        assert!(engine.is_shut_down());
        assert_eq!(engine.registry().count(), 0);
        assert_eq!(engine.pending_tasks(), 0);
    }
}
