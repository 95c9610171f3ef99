//! Fireball: a straight projectile that bursts on impact.

use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityKind, CastContext, ComputeError, Computed,
    ConfigReader, ImpactContext, ResourceKind,
};

use super::projectile_request;

pub const ID: &str = "fireball";

pub struct Fireball;

impl AbilityBehavior for Fireball {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Projectile
    }

    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        let request = projectile_request(ctx)?;
        let origin = ctx.target().origin;
        let handle = ctx.launch(request)?;
        ctx.sound(origin, "entity.blaze.shoot", 1.0, 1.0);
        Ok(Computed::Deferred(handle))
    }

    fn on_impact(&self, ctx: &mut ImpactContext<'_>) -> Result<(), ComputeError> {
        let settings = &ctx.definition().settings;
        ctx.particles(&settings.get_string("impact-particle", "explosion"), 1);
        if let Some(hit) = ctx.hit() {
            ctx.damage(hit, settings.get_double("damage", 8.0));
        }
        Ok(())
    }
}

pub fn builder() -> AbilityBuilder {
    AbilityBuilder::new(ID, Fireball)
        .display_name("Fireball")
        .description("Hurls a ball of fire that bursts on impact.")
        .category("fire")
        .tags(["projectile", "ranged"])
        .cooldown_ms(5000)
        .cost(ResourceKind::Mana, 20)
        .setting("damage", 8.0)
        .setting("speed", 1.5)
        .setting("trail-particle", "flame")
        .setting("impact-particle", "explosion")
        .setting("hit-sound", "entity.generic.explode")
        .setting("hit-volume", 1.0)
        .setting("hit-pitch", 1.2)
}
