//! Per-object scheduled callbacks.
//!
//! Both tasks capture shared handles only (arena, world, effects), never the
//! service or the scheduler, and stop themselves once their object is gone.

use std::sync::Arc;

use ability_core::{
    ActorId, FrameworkConfig, HomingSpec, HostServices, LivingEntity, ObjectHandle, TaskControl,
    TaskHandle, Vec3,
};
use tracing::debug;

use super::{SharedArena, lock};

/// Every-tick watch: trail particles, last-known position, failsafe expiry.
///
/// Expiry removes the object without resolving an impact.
pub(super) fn flight_watch(
    services: &HostServices,
    arena: &SharedArena,
    handle: ObjectHandle,
    trail: Option<String>,
    lifetime: u64,
) -> TaskHandle {
    let world = Arc::clone(&services.world);
    let effects = Arc::clone(&services.effects);
    let arena = Arc::clone(arena);
    let mut age = 0_u64;

    services.scheduler.run_repeating(
        1,
        1,
        Box::new(move || {
            age += 1;
            if !lock(&arena).contains(handle) {
                return TaskControl::Stop;
            }
            let Some(position) = world.object_position(handle) else {
                // Host removed the object without a collision.
                lock(&arena).remove(handle);
                return TaskControl::Stop;
            };
            if age >= lifetime {
                world.remove_object(handle);
                if let Some(tracked) = lock(&arena).remove(handle) {
                    for task in &tracked.tasks {
                        task.cancel();
                    }
                    debug!(
                        target: "runtime::deferred",
                        ability = %tracked.tag.ability,
                        object = %handle,
                        age,
                        "Projectile expired without impact"
                    );
                }
                return TaskControl::Stop;
            }
            if let Some(tracked) = lock(&arena).get_mut(handle) {
                tracked.last_position = position;
            }
            if let Some(particle) = &trail {
                effects.spawn_particles(position, particle, 1);
            }
            TaskControl::Continue
        }),
    )
}

/// Periodic retarget toward the nearest eligible living entity.
///
/// The new heading is `normalize(direction + to_target * strength)` at the
/// current speed; ties in distance go to the lower entity id. The launching
/// actor is skipped unless friendly fire is enabled.
pub(super) fn homing(
    services: &HostServices,
    arena: &SharedArena,
    handle: ObjectHandle,
    owner: ActorId,
    spec: HomingSpec,
    config: &FrameworkConfig,
) -> TaskHandle {
    let world = Arc::clone(&services.world);
    let arena = Arc::clone(arena);
    let period = config.homing_period.max(1);
    let lifetime = config.homing_lifetime;
    let radius = config.homing_radius;
    let mut age = 0_u64;

    services.scheduler.run_repeating(
        config.homing_delay,
        period,
        Box::new(move || {
            age += period;
            if age > lifetime || !lock(&arena).contains(handle) {
                return TaskControl::Stop;
            }
            let (Some(position), Some(velocity)) =
                (world.object_position(handle), world.object_velocity(handle))
            else {
                return TaskControl::Stop;
            };
            let Some(heading) = velocity.normalized() else {
                return TaskControl::Continue;
            };

            let candidates = world.living_entities_near(position, radius);
            let Some(target) = pick_target(candidates, position, owner, spec.friendly_fire) else {
                return TaskControl::Continue;
            };
            if let Some(steered) = steer(heading, position, target.position, spec.strength) {
                world.set_velocity(handle, steered * velocity.length());
            }
            TaskControl::Continue
        }),
    )
}

/// Nearest candidate to `position`, lower id first on equal distance.
fn pick_target(
    candidates: Vec<LivingEntity>,
    position: Vec3,
    owner: ActorId,
    friendly_fire: bool,
) -> Option<LivingEntity> {
    candidates
        .into_iter()
        .filter(|entity| friendly_fire || entity.id != owner)
        .min_by(|a, b| {
            a.position
                .distance(position)
                .total_cmp(&b.position.distance(position))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Unit heading blended toward `target`, or `None` when the target sits on
/// the object or the blend cancels out.
fn steer(heading: Vec3, position: Vec3, target: Vec3, strength: f64) -> Option<Vec3> {
    let to_target = (target - position).normalized()?;
    (heading + to_target * strength).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: ActorId = ActorId(1);

    fn entity(id: u64, x: f64, y: f64) -> LivingEntity {
        LivingEntity {
            id: ActorId(id),
            position: Vec3::new(x, y, 0.0),
        }
    }

    fn dot(a: Vec3, b: Vec3) -> f64 {
        a.x * b.x + a.y * b.y + a.z * b.z
    }

    #[test]
    fn owner_is_skipped_even_when_closest() {
        let candidates = vec![entity(1, 0.5, 0.0), entity(7, 6.0, 0.0)];

        let picked = pick_target(candidates.clone(), Vec3::ZERO, OWNER, false);
        assert_eq!(picked.map(|e| e.id), Some(ActorId(7)));

        let only_owner = pick_target(vec![entity(1, 0.5, 0.0)], Vec3::ZERO, OWNER, false);
        assert!(only_owner.is_none());

        let friendly = pick_target(candidates, Vec3::ZERO, OWNER, true);
        assert_eq!(friendly.map(|e| e.id), Some(OWNER));
    }

    #[test]
    fn nearest_target_wins() {
        let candidates = vec![entity(4, 9.0, 0.0), entity(5, 0.0, 3.0), entity(6, -5.0, 0.0)];

        let picked = pick_target(candidates, Vec3::ZERO, OWNER, false);
        assert_eq!(picked.map(|e| e.id), Some(ActorId(5)));
    }

    #[test]
    fn equal_distance_goes_to_lower_id_in_any_order() {
        let forward = vec![entity(3, 4.0, 0.0), entity(9, 0.0, 4.0), entity(12, -4.0, 0.0)];
        let mut reversed = forward.clone();
        reversed.reverse();

        for candidates in [forward, reversed] {
            let picked = pick_target(candidates, Vec3::ZERO, OWNER, false);
            assert_eq!(picked.map(|e| e.id), Some(ActorId(3)));
        }
    }

    #[test]
    fn steering_never_turns_toward_the_owner() {
        // Owner right behind the object, a creature off to the side ahead.
        let position = Vec3::new(2.0, 0.0, 0.0);
        let heading = Vec3::new(1.0, 0.0, 0.0);
        let owner_at = Vec3::new(1.5, 0.0, 0.0);
        let candidates = vec![
            LivingEntity {
                id: OWNER,
                position: owner_at,
            },
            entity(8, 6.0, 3.0),
        ];

        let Some(target) = pick_target(candidates, position, OWNER, false) else {
            panic!("creature should be picked");
        };
        let Some(steered) = steer(heading, position, target.position, 1.0) else {
            panic!("steering should produce a heading");
        };

        let to_owner = owner_at - position;
        let to_target = target.position - position;
        assert!(dot(steered, to_owner) < 0.0);
        assert!(dot(steered, to_target) > 0.0);
        assert!((steered.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn steering_blends_by_strength() {
        let heading = Vec3::new(1.0, 0.0, 0.0);
        let target = Vec3::new(0.0, 5.0, 0.0);

        let Some(gentle) = steer(heading, Vec3::ZERO, target, 0.25) else {
            panic!("gentle steer");
        };
        let Some(hard) = steer(heading, Vec3::ZERO, target, 1.0) else {
            panic!("hard steer");
        };
        assert!(gentle.y > 0.0 && gentle.y < hard.y);
        assert!(steer(heading, Vec3::ZERO, Vec3::ZERO, 1.0).is_none());
    }
}
