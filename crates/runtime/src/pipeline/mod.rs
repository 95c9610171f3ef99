//! Execution pipeline: the cast state machine.
//!
//! One call to [`CastPipeline::cast`] walks
//! lookup → prerequisites → cost → target → compute → cooldown → telemetry.
//! Nothing observable happens before cost is deducted; from that point on
//! the cooldown is always stamped, whether compute succeeds or faults.

mod outcome;

pub use outcome::{CastOutcome, CastState, FAULT_MESSAGE, Rejection};

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use ability_core::{
    AbilityDefinition, AbilityId, ActorId, CastContext, CheckContext, CompositeCheck,
    ComputeError, Computed, CooldownCheck, CooldownTracker, DeductionError, HostServices,
    Prerequisite, ProjectileLauncher, ResolvedTarget, ResourceCheck, TargetContext,
    TelemetrySink, Vec3,
};
use tracing::{debug, error, trace};

use crate::registry::AbilityRegistry;

/// Orchestrates a single cast from request to terminal state.
pub struct CastPipeline {
    registry: Arc<AbilityRegistry>,
    cooldowns: Arc<CooldownTracker>,
    services: HostServices,
    launcher: Arc<dyn ProjectileLauncher>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CastPipeline {
    pub fn new(
        registry: Arc<AbilityRegistry>,
        cooldowns: Arc<CooldownTracker>,
        services: HostServices,
        launcher: Arc<dyn ProjectileLauncher>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            services,
            launcher,
            telemetry,
        }
    }

    /// Runs one cast attempt of `ability` by `actor`.
    pub fn cast(&self, actor: ActorId, ability: &str, target: TargetContext) -> CastOutcome {
        let mut state = CastState::Requested;

        let Some(instance) = self.registry.get(ability) else {
            debug!(
                target: "runtime::pipeline",
                ability,
                actor = %actor,
                "Unknown ability requested"
            );
            return CastOutcome::Rejected(Rejection::UnknownAbility(ability.to_owned()));
        };
        let def = instance.definition();
        let actors = self.services.actors.as_ref();

        if !actors.is_online(actor) {
            return self.reject(&def.id, actor, Rejection::ActorUnavailable(actor));
        }

        // ===== prerequisites =====
        let now = self.services.scheduler.now();
        let check = Self::prerequisite_chain(def);
        let result = check.check(&CheckContext::new(actor, now, actors, &self.cooldowns));
        if !result.is_ok() {
            let reason = result.into_reason().unwrap_or_default();
            return self.reject(&def.id, actor, Rejection::Prerequisite(reason));
        }
        transition(&mut state, CastState::PrereqChecked, &def.id, actor);

        // ===== cost =====
        if !def.cost.is_empty() {
            match actors.try_deduct(actor, &def.cost) {
                Ok(()) => {}
                Err(DeductionError::Insufficient {
                    kind,
                    required,
                    available,
                }) => {
                    let rejection = Rejection::InsufficientResource {
                        kind,
                        required,
                        available,
                    };
                    return self.reject(&def.id, actor, rejection);
                }
                Err(DeductionError::UnknownActor(_)) => {
                    return self.reject(&def.id, actor, Rejection::ActorUnavailable(actor));
                }
            }
        }
        transition(&mut state, CastState::CostApplied, &def.id, actor);

        // ===== compute =====
        let resolved = self.resolve_target(actor, target);
        transition(&mut state, CastState::Computing, &def.id, actor);
        let started = Instant::now();
        let mut ctx = CastContext::new(
            actor,
            now,
            def,
            resolved,
            &self.services,
            self.launcher.as_ref(),
        );
        let computed = catch_unwind(AssertUnwindSafe(|| instance.behavior().compute(&mut ctx)))
            .unwrap_or_else(|_| Err(ComputeError::failed("ability behavior panicked")));

        self.cooldowns
            .stamp(actor, &def.id, now, def.cooldown_ticks());

        match computed {
            Ok(computed) => {
                self.telemetry.cast_success(&def.id, started.elapsed());
                let ability = def.id.clone();
                let outcome = match computed {
                    Computed::Applied => CastOutcome::Applied { ability },
                    Computed::Deferred(handle) => CastOutcome::Deferred { ability, handle },
                    Computed::Channeling(task) => CastOutcome::Channeling { ability, task },
                };
                transition(&mut state, outcome.state(), &def.id, actor);
                outcome
            }
            Err(err) => {
                error!(
                    target: "runtime::pipeline",
                    ability = %def.id,
                    actor = %actor,
                    error = %err,
                    "Ability compute failed after cost was taken"
                );
                self.telemetry.cast_failure(FAULT_MESSAGE);
                CastOutcome::Faulted {
                    ability: def.id.clone(),
                    error: err,
                }
            }
        }
    }

    /// Cooldown first, then the ability's own checks, then a holding check
    /// per cost entry.
    fn prerequisite_chain(def: &AbilityDefinition) -> CompositeCheck {
        let mut chain = CompositeCheck::default()
            .with(CooldownCheck::labeled(def.id.clone(), def.display_name.clone()));
        chain.push(Arc::clone(&def.prerequisite));
        for cost in &def.cost {
            chain.push(Arc::new(ResourceCheck::new(cost.kind, cost.amount)) as Arc<dyn Prerequisite>);
        }
        chain
    }

    /// Captures positions once; compute never re-queries them.
    fn resolve_target(&self, actor: ActorId, target: TargetContext) -> ResolvedTarget {
        let world = self.services.world.as_ref();
        let origin = world.entity_position(actor).unwrap_or(Vec3::ZERO);
        let position = target.entity.and_then(|entity| world.entity_position(entity));
        let direction = target
            .direction
            .and_then(Vec3::normalized)
            .or_else(|| position.and_then(|pos| (pos - origin).normalized()));

        ResolvedTarget {
            entity: target.entity,
            position,
            origin,
            direction,
        }
    }

    fn reject(&self, ability: &AbilityId, actor: ActorId, rejection: Rejection) -> CastOutcome {
        debug!(
            target: "runtime::pipeline",
            ability = %ability,
            actor = %actor,
            reason = %rejection,
            "Cast rejected"
        );
        self.telemetry.cast_failure(&rejection.user_message());
        CastOutcome::Rejected(rejection)
    }
}

fn transition(state: &mut CastState, next: CastState, ability: &AbilityId, actor: ActorId) {
    trace!(
        target: "runtime::pipeline",
        ability = %ability,
        actor = %actor,
        from = %state,
        to = %next,
        "Cast state transition"
    );
    *state = next;
}
