use crate::ability::AbilityId;
use crate::config::FrameworkConfig;
use crate::error::LaunchError;
use crate::types::{ActorId, Vec3};

use super::ObjectHandle;

/// Homing behavior for a launched projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HomingSpec {
    /// Blend factor toward the target, clamped to `0.0..=1.0`.
    pub strength: f64,
    /// Allows the launching actor to be picked as a target.
    pub friendly_fire: bool,
}

/// Sound played at the impact point.
#[derive(Clone, Debug, PartialEq)]
pub struct HitSound {
    pub key: String,
    pub volume: f32,
    pub pitch: f32,
}

/// Parameters for [`ProjectileLauncher::launch`].
///
/// Setters clamp into the supported ranges instead of rejecting.
#[derive(Clone, Debug, PartialEq)]
pub struct LaunchRequest {
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f64,
    pub homing: Option<HomingSpec>,
    pub trail: Option<String>,
    pub hit_sound: Option<HitSound>,
    /// Failsafe lifetime override in ticks.
    pub lifetime: Option<u64>,
}

impl LaunchRequest {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            speed: FrameworkConfig::DEFAULT_PROJECTILE_SPEED,
            homing: None,
            trail: None,
            hit_sound: None,
            lifetime: None,
        }
    }

    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = if speed.is_finite() {
            speed.clamp(
                FrameworkConfig::MIN_PROJECTILE_SPEED,
                FrameworkConfig::MAX_PROJECTILE_SPEED,
            )
        } else {
            FrameworkConfig::DEFAULT_PROJECTILE_SPEED
        };
        self
    }

    #[must_use]
    pub fn homing(mut self, strength: f64, friendly_fire: bool) -> Self {
        let strength = if strength.is_finite() {
            strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.homing = Some(HomingSpec {
            strength,
            friendly_fire,
        });
        self
    }

    #[must_use]
    pub fn trail(mut self, particle: impl Into<String>) -> Self {
        let particle = particle.into();
        self.trail = (!particle.is_empty()).then_some(particle);
        self
    }

    #[must_use]
    pub fn hit_sound(mut self, key: impl Into<String>, volume: f32, pitch: f32) -> Self {
        let key = key.into();
        if key.is_empty() {
            self.hit_sound = None;
            return self;
        }
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
        let pitch = if pitch.is_finite() { pitch.clamp(0.5, 2.0) } else { 1.0 };
        self.hit_sound = Some(HitSound { key, volume, pitch });
        self
    }

    #[must_use]
    pub fn lifetime(mut self, ticks: u64) -> Self {
        self.lifetime = (ticks > 0).then_some(ticks);
        self
    }

    /// Initial velocity, or `None` if the direction cannot be normalized.
    pub fn velocity(&self) -> Option<Vec3> {
        self.direction.normalized().map(|dir| dir * self.speed)
    }
}

/// Entry point abilities use to spawn deferred-effect projectiles.
pub trait ProjectileLauncher: Send + Sync {
    /// Spawns a tracked object tagged with `owner` and `ability`.
    fn launch(
        &self,
        owner: ActorId,
        ability: &AbilityId,
        request: LaunchRequest,
    ) -> Result<ObjectHandle, LaunchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_into_supported_ranges() {
        let request = LaunchRequest::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))
            .speed(42.0)
            .homing(3.5, false)
            .hit_sound("impact", 4.0, 0.1);

        assert_eq!(request.speed, FrameworkConfig::MAX_PROJECTILE_SPEED);
        assert_eq!(request.homing.map(|h| h.strength), Some(1.0));
        let sound = request.hit_sound.clone();
        assert_eq!(sound.as_ref().map(|s| s.volume), Some(1.0));
        assert_eq!(sound.as_ref().map(|s| s.pitch), Some(0.5));

        let slow = LaunchRequest::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)).speed(0.0);
        assert_eq!(slow.speed, FrameworkConfig::MIN_PROJECTILE_SPEED);
    }

    #[test]
    fn velocity_scales_unit_direction() {
        let request = LaunchRequest::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)).speed(3.0);
        assert_eq!(request.velocity(), Some(Vec3::new(0.0, 0.0, 3.0)));

        let stuck = LaunchRequest::new(Vec3::ZERO, Vec3::ZERO);
        assert!(stuck.velocity().is_none());
    }
}
