//! Blizzard: a channeled storm pulsing damage around a point.

use std::sync::Arc;

use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityKind, CastContext, ComputeError, Computed,
    ConfigReader, LevelCheck, ResourceKind, TaskControl,
};

pub const ID: &str = "blizzard";

pub struct Blizzard;

impl AbilityBehavior for Blizzard {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Channeled
    }

    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        let definition = ctx.definition();
        let settings = &definition.settings;
        let pulses = settings.get_int("pulses", 5).clamp(1, 100) as u32;
        let period = settings.get_int("period-ticks", 10).clamp(1, 200) as u64;
        let radius = settings.get_double("radius", 5.0).max(0.5);
        let damage = settings.get_double("damage", 2.0);
        let friendly_fire = definition.allows_friendly_fire();
        let center = ctx.target().position.unwrap_or(ctx.target().origin);

        let caster = ctx.actor();
        let world = Arc::clone(&ctx.services().world);
        let effects = Arc::clone(&ctx.services().effects);
        let mut remaining = pulses;

        let handle = ctx.channel(
            0,
            period,
            Box::new(move || {
                effects.spawn_particles(center, "snowflake", 40);
                for entity in world.living_entities_near(center, radius) {
                    if entity.id == caster && !friendly_fire {
                        continue;
                    }
                    effects.apply_damage(entity.id, damage, Some(caster));
                }
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    TaskControl::Stop
                } else {
                    TaskControl::Continue
                }
            }),
        );
        Ok(Computed::Channeling(handle))
    }
}

pub fn builder() -> AbilityBuilder {
    AbilityBuilder::new(ID, Blizzard)
        .description("Summons a freezing storm that damages everything inside.")
        .category("ice")
        .tags(["area", "channel"])
        .cooldown_ms(12_000)
        .cost(ResourceKind::Mana, 40)
        .prerequisite(LevelCheck::new(8))
        .setting("pulses", 5)
        .setting("period-ticks", 10)
        .setting("radius", 5.0)
        .setting("damage", 2.0)
}
