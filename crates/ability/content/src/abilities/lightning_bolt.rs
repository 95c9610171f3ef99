//! Lightning bolt: instant damage on a targeted entity within range.

use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityKind, CastContext, ComputeError, Computed,
    ConfigReader, LevelCheck, ResourceKind,
};

pub const ID: &str = "lightning-bolt";

pub struct LightningBolt;

impl AbilityBehavior for LightningBolt {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Instant
    }

    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        let (target, position) = ctx.require_target()?;
        let settings = &ctx.definition().settings;

        ctx.particles(position, "electric_spark", 24);
        ctx.sound(position, "entity.lightning_bolt.thunder", 0.8, 1.0);
        ctx.damage(target, settings.get_double("damage", 10.0));
        Ok(Computed::Applied)
    }
}

pub fn builder() -> AbilityBuilder {
    AbilityBuilder::new(ID, LightningBolt)
        .description("Calls down lightning on a target.")
        .category("lightning")
        .tag("ranged")
        .cooldown_ms(4000)
        .cost(ResourceKind::Mana, 25)
        .range(20.0)
        .prerequisite(LevelCheck::new(5))
        .setting("damage", 10.0)
}
