//! Heal: restores the caster's health.

use ability_core::{
    AbilityBehavior, AbilityBuilder, AbilityKind, CastContext, ComputeError, Computed,
    ConfigReader, ResourceKind,
};

pub const ID: &str = "heal";

pub struct Heal;

impl AbilityBehavior for Heal {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Instant
    }

    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
        let settings = &ctx.definition().settings;
        let amount = settings.get_double("amount", 6.0);

        ctx.heal(ctx.actor(), amount);
        ctx.particles(ctx.target().origin, "heart", 5);
        ctx.message(&settings.get_string("message", "You feel rejuvenated."));
        Ok(Computed::Applied)
    }
}

pub fn builder() -> AbilityBuilder {
    AbilityBuilder::new(ID, Heal)
        .description("Restores some of your health.")
        .category("holy")
        .tag("self")
        .cooldown_ms(8000)
        .cost(ResourceKind::Mana, 10)
        .setting("amount", 6.0)
        .setting("message", "You feel rejuvenated.")
}
