//! Deferred-effect sub-protocol (projectile pattern).
//!
//! - [`ProjectileService`] launches tracked world objects for abilities and
//!   implements [`ProjectileLauncher`]
//! - every object gets a [`DeferredEffectHandle`] tag in a generational
//!   [`Arena`] the moment it is spawned
//! - a flight-watch task per object emits trail particles, follows the
//!   object and removes it when the failsafe lifetime elapses
//! - an optional homing task steers the object toward the nearest eligible
//!   living entity
//! - [`ProjectileService::resolve_impact`] applies the impact at most once
//!   per object, whatever order or number of collision callbacks arrive

mod arena;
mod tasks;

pub use arena::{Arena, ArenaFull};

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use ability_core::{
    AbilityId, ActorId, FrameworkConfig, HitSound, HostServices, ImpactContext, LaunchError,
    LaunchRequest, ObjectHandle, ProjectileLauncher, TaskHandle, TelemetrySink, Tick, Vec3,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::registry::AbilityRegistry;

/// Durable tag attached to a launched object.
///
/// Lives in the arena slot of its object, not in the cast that created it.
/// `processed` flips from false to true exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredEffectHandle {
    pub spawn_tick: Tick,
    pub ability: AbilityId,
    pub owner: ActorId,
    pub processed: bool,
}

impl DeferredEffectHandle {
    pub fn new(spawn_tick: Tick, ability: AbilityId, owner: ActorId) -> Self {
        Self {
            spawn_tick,
            ability,
            owner,
            processed: false,
        }
    }
}

/// Arena entry: the durable tag plus bookkeeping for the object's tasks.
#[derive(Debug)]
pub(crate) struct TrackedObject {
    pub(crate) tag: DeferredEffectHandle,
    pub(crate) hit_sound: Option<HitSound>,
    pub(crate) tasks: Vec<TaskHandle>,
    /// Last position reported by the flight watch.
    pub(crate) last_position: Vec3,
}

pub(crate) type SharedArena = Arc<Mutex<Arena<TrackedObject>>>;

pub(crate) fn lock(arena: &SharedArena) -> MutexGuard<'_, Arena<TrackedObject>> {
    arena.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a collision callback amounted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImpactOutcome {
    /// The impact was applied. `attributed` is false when the owner had
    /// gone offline and only environmental effects ran.
    Resolved { ability: AbilityId, attributed: bool },
    /// The object was already processed; nothing happened.
    Duplicate,
    /// The handle no longer refers to a tracked object.
    Stale,
    /// The launching ability is no longer registered; the object was removed.
    Orphaned { ability: AbilityId },
}

impl ImpactOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Launches and resolves tracked projectiles.
pub struct ProjectileService {
    arena: SharedArena,
    services: HostServices,
    registry: Arc<AbilityRegistry>,
    telemetry: Arc<dyn TelemetrySink>,
    config: FrameworkConfig,
    shut_down: AtomicBool,
}

impl ProjectileService {
    pub fn new(
        services: HostServices,
        registry: Arc<AbilityRegistry>,
        telemetry: Arc<dyn TelemetrySink>,
        config: FrameworkConfig,
    ) -> Self {
        Self {
            arena: Arc::new(Mutex::new(Arena::new())),
            services,
            registry,
            telemetry,
            config,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Number of objects currently in flight.
    pub fn active_count(&self) -> usize {
        lock(&self.arena).len()
    }

    /// Tag of a tracked object.
    pub fn tag(&self, handle: ObjectHandle) -> Option<DeferredEffectHandle> {
        lock(&self.arena).get(handle).map(|tracked| tracked.tag.clone())
    }

    /// Handles of every object launched by `owner`.
    pub fn owned_by(&self, owner: ActorId) -> Vec<ObjectHandle> {
        lock(&self.arena)
            .iter()
            .filter(|(_, tracked)| tracked.tag.owner == owner)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Resolves a host collision callback for `handle`.
    ///
    /// The tag is checked and flipped under the arena lock before any effect
    /// runs, so duplicate or reordered callbacks are no-ops. The object is
    /// removed from the world and the arena afterwards.
    pub fn resolve_impact(&self, handle: ObjectHandle, hit: Option<ActorId>) -> ImpactOutcome {
        let (tag, hit_sound, last_position) = {
            let mut arena = lock(&self.arena);
            let Some(tracked) = arena.get_mut(handle) else {
                trace!(target: "runtime::deferred", object = %handle, "Impact for untracked object ignored");
                return ImpactOutcome::Stale;
            };
            if tracked.tag.processed {
                trace!(target: "runtime::deferred", object = %handle, "Duplicate impact ignored");
                return ImpactOutcome::Duplicate;
            }
            tracked.tag.processed = true;
            for task in &tracked.tasks {
                task.cancel();
            }
            (tracked.tag.clone(), tracked.hit_sound.clone(), tracked.last_position)
        };

        let started = Instant::now();
        let world = self.services.world.as_ref();
        let position = world.object_position(handle).unwrap_or(last_position);

        let Some(ability) = self.registry.get(tag.ability.as_str()) else {
            debug!(
                target: "runtime::deferred",
                ability = %tag.ability,
                object = %handle,
                "Impact for unregistered ability, removing object"
            );
            self.remove(handle);
            return ImpactOutcome::Orphaned {
                ability: tag.ability,
            };
        };

        let owner = self
            .services
            .actors
            .is_online(tag.owner)
            .then_some(tag.owner);
        if owner.is_none() {
            debug!(
                target: "runtime::deferred",
                ability = %tag.ability,
                owner = %tag.owner,
                "Owner offline, skipping attributed impact effects"
            );
        }

        if let Some(sound) = &hit_sound
            && position.is_finite()
        {
            self.services
                .effects
                .play_sound(position, &sound.key, sound.volume, sound.pitch);
        }

        let now = self.services.scheduler.now();
        let mut ctx = ImpactContext::new(
            ability.definition(),
            owner,
            handle,
            position,
            hit,
            tag.spawn_tick,
            now,
            self.services.effects.as_ref(),
        );
        let result = catch_unwind(AssertUnwindSafe(|| ability.behavior().on_impact(&mut ctx)));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(
                target: "runtime::deferred",
                ability = %tag.ability,
                owner = %tag.owner,
                error = %err,
                "Impact resolution failed"
            ),
            Err(_) => error!(
                target: "runtime::deferred",
                ability = %tag.ability,
                owner = %tag.owner,
                "Impact resolution panicked"
            ),
        }

        self.remove(handle);
        self.telemetry.effect_processing(started.elapsed());
        ImpactOutcome::Resolved {
            ability: tag.ability,
            attributed: owner.is_some(),
        }
    }

    /// Cancels every object's tasks and removes all tracked objects from
    /// the world. Later launches fail with [`LaunchError::ShutDown`].
    pub fn shutdown(&self) -> usize {
        self.shut_down.store(true, Ordering::Release);
        let drained = lock(&self.arena).drain();
        for (handle, tracked) in &drained {
            for task in &tracked.tasks {
                task.cancel();
            }
            self.services.world.remove_object(*handle);
        }
        if !drained.is_empty() {
            debug!(
                target: "runtime::deferred",
                removed = drained.len(),
                "Removed tracked objects on shutdown"
            );
        }
        drained.len()
    }

    fn remove(&self, handle: ObjectHandle) {
        self.services.world.remove_object(handle);
        if let Some(tracked) = lock(&self.arena).remove(handle) {
            for task in &tracked.tasks {
                task.cancel();
            }
        }
    }
}

impl ProjectileLauncher for ProjectileService {
    fn launch(
        &self,
        owner: ActorId,
        ability: &AbilityId,
        request: LaunchRequest,
    ) -> Result<ObjectHandle, LaunchError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(LaunchError::ShutDown);
        }
        let velocity = request.velocity().ok_or(LaunchError::InvalidDirection)?;
        if !request.origin.is_finite() {
            return Err(LaunchError::InvalidDirection);
        }

        let now = self.services.scheduler.now();
        let inserted = lock(&self.arena).insert(TrackedObject {
            tag: DeferredEffectHandle::new(now, ability.clone(), owner),
            hit_sound: request.hit_sound.clone(),
            tasks: Vec::new(),
            last_position: request.origin,
        });
        let handle = match inserted {
            Ok(handle) => handle,
            Err((full, _)) => {
                warn!(
                    target: "runtime::deferred",
                    ability = %ability,
                    capacity = full.capacity,
                    "Projectile arena full, launch refused"
                );
                return Err(LaunchError::CapacityExhausted);
            }
        };

        if !self
            .services
            .world
            .spawn_projectile(handle, request.origin, velocity)
        {
            lock(&self.arena).remove(handle);
            return Err(LaunchError::HostRejected);
        }

        let lifetime = request.lifetime.unwrap_or(self.config.projectile_lifetime);
        let mut task_handles = vec![tasks::flight_watch(
            &self.services,
            &self.arena,
            handle,
            request.trail.clone(),
            lifetime,
        )];
        if let Some(homing) = request.homing {
            task_handles.push(tasks::homing(
                &self.services,
                &self.arena,
                handle,
                owner,
                homing,
                &self.config,
            ));
        }
        if let Some(tracked) = lock(&self.arena).get_mut(handle) {
            tracked.tasks = task_handles;
        }

        trace!(
            target: "runtime::deferred",
            ability = %ability,
            owner = %owner,
            object = %handle,
            lifetime,
            "Projectile launched"
        );
        Ok(handle)
    }
}
