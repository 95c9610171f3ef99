//! Standard abilities shipped with the framework.
//!
//! Each ability is a zero-sized behavior plus a `builder()` carrying its
//! compiled defaults. Tunable numbers live in the builder's settings so a
//! config section can override them without code changes.

pub mod blizzard;
pub mod fireball;
pub mod heal;
pub mod homing_missile;
pub mod lightning_bolt;

use ability_core::{AbilityBuilder, CastContext, ComputeError, ConfigReader, LaunchRequest};

pub use blizzard::Blizzard;
pub use fireball::Fireball;
pub use heal::Heal;
pub use homing_missile::HomingMissile;
pub use lightning_bolt::LightningBolt;

/// Builders for every standard ability, in registration order.
pub fn standard_abilities() -> Vec<AbilityBuilder> {
    vec![
        fireball::builder(),
        homing_missile::builder(),
        lightning_bolt::builder(),
        heal::builder(),
        blizzard::builder(),
    ]
}

/// Distance in front of the caster at which projectiles spawn.
const SPAWN_OFFSET: f64 = 1.0;

/// Launch request shared by projectile abilities, read from settings:
/// `speed`, `trail-particle`, `hit-sound`, `hit-volume`, `hit-pitch`.
pub(crate) fn projectile_request(ctx: &CastContext<'_>) -> Result<LaunchRequest, ComputeError> {
    let settings = &ctx.definition().settings;
    let direction = ctx
        .target()
        .direction
        .and_then(|dir| dir.normalized())
        .ok_or(ComputeError::MissingTarget)?;
    let origin = ctx.target().origin + direction * SPAWN_OFFSET;

    Ok(LaunchRequest::new(origin, direction)
        .speed(settings.get_double("speed", 1.5))
        .trail(settings.get_string("trail-particle", ""))
        .hit_sound(
            settings.get_string("hit-sound", ""),
            settings.get_double("hit-volume", 1.0) as f32,
            settings.get_double("hit-pitch", 1.0) as f32,
        ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use ability_core::{AbilityKind, ConfigSection};

    use super::*;

    #[test]
    fn standard_abilities_build_with_unique_ids() {
        let mut ids = HashSet::new();
        for builder in standard_abilities() {
            let Ok(instance) = builder.build() else {
                panic!("{} must build from compiled defaults", builder.id());
            };
            assert!(ids.insert(instance.id().clone()));
        }
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn fireball_defaults_and_overrides() {
        let Ok(instance) = fireball::builder().build() else {
            panic!("fireball must build");
        };
        let def = instance.definition();
        assert_eq!(instance.kind(), AbilityKind::Projectile);
        assert_eq!(def.cooldown_ticks(), 100);
        assert_eq!(def.category, "fire");

        let overrides = ConfigSection::new().with("damage", 12.0).with("cost.mana", 5);
        let Ok(tuned) = fireball::builder().build_with(&overrides) else {
            panic!("fireball overrides must build");
        };
        assert_eq!(tuned.definition().settings.get_double("damage", 0.0), 12.0);
        assert_eq!(tuned.definition().cost.len(), 1);
        assert_eq!(tuned.definition().cost[0].amount, 5);
    }
}
