use crate::ability::AbilityId;
use crate::types::{ResourceKind, Tick};

use super::{CheckContext, Prerequisite, PrerequisiteResult};

/// Always succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoneCheck;

impl Prerequisite for NoneCheck {
    fn check(&self, _ctx: &CheckContext<'_>) -> PrerequisiteResult {
        PrerequisiteResult::success()
    }
}

/// Succeeds iff the actor's level is at least `min_level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelCheck {
    pub min_level: u32,
}

impl LevelCheck {
    pub const fn new(min_level: u32) -> Self {
        Self { min_level }
    }
}

impl Prerequisite for LevelCheck {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult {
        match ctx.actors.level(ctx.actor) {
            Some(level) if level >= self.min_level => PrerequisiteResult::success(),
            _ => PrerequisiteResult::failure(format!(
                "You need level {} to cast this ability",
                self.min_level
            )),
        }
    }

    fn min_level(&self) -> Option<u32> {
        Some(self.min_level)
    }
}

/// Succeeds iff the actor currently holds at least `amount` of `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceCheck {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl ResourceCheck {
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

impl Prerequisite for ResourceCheck {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult {
        match ctx.actors.resource(ctx.actor, self.kind) {
            Some(held) if held >= self.amount => PrerequisiteResult::success(),
            _ => PrerequisiteResult::failure(format!(
                "You need {} {} to cast this ability",
                self.amount, self.kind
            )),
        }
    }
}

/// Succeeds iff the actor has no remaining cooldown on `ability`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooldownCheck {
    pub ability: AbilityId,
    /// Name used in the rejection reason.
    pub label: String,
}

impl CooldownCheck {
    pub fn new(ability: AbilityId) -> Self {
        let label = ability.to_string();
        Self { ability, label }
    }

    pub fn labeled(ability: AbilityId, label: impl Into<String>) -> Self {
        Self {
            ability,
            label: label.into(),
        }
    }
}

impl Prerequisite for CooldownCheck {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult {
        let remaining = ctx.cooldowns.remaining(ctx.actor, &self.ability, ctx.now);
        if remaining == 0 {
            return PrerequisiteResult::success();
        }
        let seconds = Tick::millis_of(remaining) as f64 / 1000.0;
        PrerequisiteResult::failure(format!(
            "{} is on cooldown for {:.1}s",
            self.label, seconds
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::CooldownTracker;
    use crate::prereq::testing::StaticActors;
    use crate::types::ActorId;

    const ACTOR: ActorId = ActorId(7);

    #[test]
    fn level_check_compares_inclusively() {
        let cooldowns = CooldownTracker::new();
        let check = LevelCheck::new(10);

        for (level, expected) in [(9, false), (10, true), (11, true)] {
            let actors = StaticActors::default().with_level(ACTOR, level);
            let ctx = CheckContext::new(ACTOR, Tick::ZERO, &actors, &cooldowns);
            assert_eq!(check.check(&ctx).is_ok(), expected, "level {level}");
        }
    }

    #[test]
    fn unknown_actor_fails_level_check() {
        let cooldowns = CooldownTracker::new();
        let actors = StaticActors::default();
        let ctx = CheckContext::new(ACTOR, Tick::ZERO, &actors, &cooldowns);

        assert!(!LevelCheck::new(1).check(&ctx).is_ok());
    }

    #[test]
    fn resource_check_names_the_shortfall() {
        let cooldowns = CooldownTracker::new();
        let actors = StaticActors::default()
            .with_level(ACTOR, 1)
            .with_resource(ACTOR, ResourceKind::Mana, 15);
        let ctx = CheckContext::new(ACTOR, Tick::ZERO, &actors, &cooldowns);

        assert!(ResourceCheck::new(ResourceKind::Mana, 15).check(&ctx).is_ok());
        let result = ResourceCheck::new(ResourceKind::Mana, 20).check(&ctx);
        assert_eq!(result.reason(), Some("You need 20 mana to cast this ability"));
    }

    #[test]
    fn cooldown_check_reports_remaining_seconds() {
        let cooldowns = CooldownTracker::new();
        let actors = StaticActors::default().with_level(ACTOR, 1);
        let fireball = AbilityId::new("fireball");
        cooldowns.stamp(ACTOR, &fireball, Tick(10), 100);

        let check = CooldownCheck::labeled(fireball, "Fireball");
        let blocked = check.check(&CheckContext::new(ACTOR, Tick(40), &actors, &cooldowns));
        assert_eq!(blocked.reason(), Some("Fireball is on cooldown for 3.5s"));

        let ready = check.check(&CheckContext::new(ACTOR, Tick(110), &actors, &cooldowns));
        assert!(ready.is_ok());
    }
}
