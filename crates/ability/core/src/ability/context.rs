//! Contexts handed to ability behaviors.

use crate::env::{ActorSource, EffectSink, HostServices, LaunchRequest, ProjectileLauncher};
use crate::env::{ObjectHandle, RepeatingTask, Scheduler, TaskHandle, WorldHost};
use crate::error::{ComputeError, LaunchError};
use crate::types::{ActorId, Tick, Vec3};

use super::AbilityDefinition;

/// Targeting input supplied with a cast request.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TargetContext {
    /// Explicit target entity, if the trigger picked one.
    pub entity: Option<ActorId>,
    /// Aim direction of the caster.
    pub direction: Option<Vec3>,
}

impl TargetContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn entity(entity: ActorId) -> Self {
        Self {
            entity: Some(entity),
            direction: None,
        }
    }

    pub fn direction(direction: Vec3) -> Self {
        Self {
            entity: None,
            direction: Some(direction),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Target resolved once by the pipeline before compute.
///
/// Positions are captured at resolution time and never re-queried.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ResolvedTarget {
    pub entity: Option<ActorId>,
    pub position: Option<Vec3>,
    /// Caster position at cast time.
    pub origin: Vec3,
    /// Unit aim direction; falls back to the direction toward the target.
    pub direction: Option<Vec3>,
}

impl ResolvedTarget {
    /// Distance from the caster to the target, if the target has a position.
    pub fn distance(&self) -> Option<f64> {
        self.position.map(|pos| self.origin.distance(pos))
    }
}

// ============================================================================
// Cast context
// ============================================================================

/// Everything an ability's compute entrypoint may touch.
pub struct CastContext<'a> {
    actor: ActorId,
    now: Tick,
    definition: &'a AbilityDefinition,
    target: ResolvedTarget,
    services: &'a HostServices,
    launcher: &'a dyn ProjectileLauncher,
}

impl<'a> CastContext<'a> {
    pub fn new(
        actor: ActorId,
        now: Tick,
        definition: &'a AbilityDefinition,
        target: ResolvedTarget,
        services: &'a HostServices,
        launcher: &'a dyn ProjectileLauncher,
    ) -> Self {
        Self {
            actor,
            now,
            definition,
            target,
            services,
            launcher,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn definition(&self) -> &'a AbilityDefinition {
        self.definition
    }

    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    /// Shared host handles, for behaviors that capture them in scheduled tasks.
    pub fn services(&self) -> &'a HostServices {
        self.services
    }

    pub fn actors(&self) -> &'a dyn ActorSource {
        self.services.actors.as_ref()
    }

    pub fn world(&self) -> &'a dyn WorldHost {
        self.services.world.as_ref()
    }

    pub fn effects(&self) -> &'a dyn EffectSink {
        self.services.effects.as_ref()
    }

    pub fn scheduler(&self) -> &'a dyn Scheduler {
        self.services.scheduler.as_ref()
    }

    /// Target entity and position, failing with [`ComputeError::MissingTarget`]
    /// or [`ComputeError::OutOfRange`].
    pub fn require_target(&self) -> Result<(ActorId, Vec3), ComputeError> {
        let (Some(entity), Some(position)) = (self.target.entity, self.target.position) else {
            return Err(ComputeError::MissingTarget);
        };
        let distance = self.target.origin.distance(position);
        if !self.definition.in_range(distance) {
            return Err(ComputeError::OutOfRange {
                distance,
                range: self.definition.range,
            });
        }
        Ok((entity, position))
    }

    /// Launches a deferred-effect projectile owned by the casting actor.
    pub fn launch(&self, request: LaunchRequest) -> Result<ObjectHandle, LaunchError> {
        self.launcher
            .launch(self.actor, &self.definition.id, request)
    }

    /// Schedules a channeled pulse task on the main line.
    pub fn channel(&self, delay_ticks: u64, period_ticks: u64, pulse: RepeatingTask) -> TaskHandle {
        self.scheduler()
            .run_repeating(delay_ticks, period_ticks.max(1), pulse)
    }

    // ===== effect shortcuts =====

    pub fn particles(&self, at: Vec3, particle: &str, count: u32) {
        if !particle.is_empty() && count > 0 && at.is_finite() {
            self.effects().spawn_particles(at, particle, count);
        }
    }

    pub fn sound(&self, at: Vec3, sound: &str, volume: f32, pitch: f32) {
        if !sound.is_empty() && at.is_finite() {
            self.effects().play_sound(at, sound, volume, pitch);
        }
    }

    pub fn damage(&self, target: ActorId, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.effects().apply_damage(target, amount, Some(self.actor));
        }
    }

    pub fn heal(&self, target: ActorId, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.effects().apply_healing(target, amount);
        }
    }

    pub fn message(&self, text: &str) {
        if !text.is_empty() {
            self.effects().send_message(self.actor, text);
        }
    }
}

// ============================================================================
// Impact context
// ============================================================================

/// Context for resolving a deferred impact.
///
/// `owner` is `None` when the launching actor is no longer online;
/// behaviors then skip attributed effects but still play environmental ones.
pub struct ImpactContext<'a> {
    definition: &'a AbilityDefinition,
    owner: Option<ActorId>,
    handle: ObjectHandle,
    position: Vec3,
    hit: Option<ActorId>,
    spawned_at: Tick,
    now: Tick,
    effects: &'a dyn EffectSink,
}

impl<'a> ImpactContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        definition: &'a AbilityDefinition,
        owner: Option<ActorId>,
        handle: ObjectHandle,
        position: Vec3,
        hit: Option<ActorId>,
        spawned_at: Tick,
        now: Tick,
        effects: &'a dyn EffectSink,
    ) -> Self {
        Self {
            definition,
            owner,
            handle,
            position,
            hit,
            spawned_at,
            now,
            effects,
        }
    }

    pub fn definition(&self) -> &'a AbilityDefinition {
        self.definition
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Entity the projectile collided with, if any.
    pub fn hit(&self) -> Option<ActorId> {
        self.hit
    }

    /// Ticks the projectile spent in flight.
    pub fn flight_ticks(&self) -> u64 {
        self.now.since(self.spawned_at)
    }

    pub fn effects(&self) -> &'a dyn EffectSink {
        self.effects
    }

    pub fn particles(&self, particle: &str, count: u32) {
        if !particle.is_empty() && count > 0 && self.position.is_finite() {
            self.effects.spawn_particles(self.position, particle, count);
        }
    }

    pub fn sound(&self, sound: &str, volume: f32, pitch: f32) {
        if !sound.is_empty() && self.position.is_finite() {
            self.effects.play_sound(self.position, sound, volume, pitch);
        }
    }

    /// Attributed damage; skipped when the owner is gone.
    pub fn damage(&self, target: ActorId, amount: f64) {
        let Some(owner) = self.owner else {
            return;
        };
        if target == owner && !self.definition.allows_friendly_fire() {
            return;
        }
        if amount.is_finite() && amount > 0.0 {
            self.effects.apply_damage(target, amount, Some(owner));
        }
    }

    /// Message to the owner; skipped when the owner is gone.
    pub fn message(&self, text: &str) {
        if let Some(owner) = self.owner
            && !text.is_empty()
        {
            self.effects.send_message(owner, text);
        }
    }
}
