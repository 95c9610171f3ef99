//! Homing missile: a slow arcane projectile that steers toward the nearest
//! living entity.

use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityKind, CastContext, ComputeError, Computed,
    ConfigReader, ImpactContext, LevelCheck, ResourceKind,
};

use super::projectile_request;

pub const ID: &str = "homing-missile";

pub struct HomingMissile;

impl AbilityBehavior for HomingMissile {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Projectile
    }

    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        let definition = ctx.definition();
        let request = projectile_request(ctx)?.homing(
            definition.settings.get_double("homing-strength", 0.25),
            definition.allows_friendly_fire(),
        );
        let handle = ctx.launch(request)?;
        Ok(Computed::Deferred(handle))
    }

    fn on_impact(&self, ctx: &mut ImpactContext<'_>) -> Result<(), ComputeError> {
        let settings = &ctx.definition().settings;
        ctx.particles("witch", 12);
        if let Some(hit) = ctx.hit() {
            ctx.damage(hit, settings.get_double("damage", 5.0));
        }
        Ok(())
    }
}

pub fn builder() -> AbilityBuilder {
    AbilityBuilder::new(ID, HomingMissile)
        .description("Fires a missile that seeks the nearest target.")
        .category("arcane")
        .tags(["projectile", "ranged", "homing"])
        .cooldown_ms(3000)
        .cost(ResourceKind::Mana, 15)
        .prerequisite(LevelCheck::new(3))
        .setting("damage", 5.0)
        .setting("speed", 0.8)
        .setting("homing-strength", 0.25)
        .setting("trail-particle", "enchant")
        .setting("hit-sound", "entity.illusioner.cast_spell")
}
