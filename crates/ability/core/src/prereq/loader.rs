//! Declarative prerequisite construction.
//!
//! ```toml
//! [abilities.meteor.prerequisite]
//! type = "composite"
//! prerequisites = ["veteran", "focus"]
//!
//! [abilities.meteor.prerequisite.veteran]
//! type = "level"
//! level = 20
//!
//! [abilities.meteor.prerequisite.focus]
//! type = "resource"
//! resource = "mana"
//! amount = 50
//! ```

use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::ability::AbilityId;
use crate::config::ConfigReader;
use crate::types::ResourceKind;

use super::{CompositeCheck, CooldownCheck, LevelCheck, NoneCheck, Prerequisite, ResourceCheck};

/// Nesting limit for composite sections; deeper trees collapse to [`NoneCheck`].
const MAX_DEPTH: usize = 8;

/// Builds a check tree from a section keyed by `type`.
///
/// Never fails: an unknown or missing `type`, an unknown resource kind or a
/// missing composite child becomes [`NoneCheck`] with a logged warning.
pub fn from_config(section: &dyn ConfigReader, owner: &AbilityId) -> Arc<dyn Prerequisite> {
    parse(section, owner, 0)
}

fn parse(section: &dyn ConfigReader, owner: &AbilityId, depth: usize) -> Arc<dyn Prerequisite> {
    if depth >= MAX_DEPTH {
        warn!(
            target: "ability_core::prereq",
            ability = %owner,
            depth,
            "Prerequisite nesting too deep, using none"
        );
        return Arc::new(NoneCheck);
    }

    let Some(kind) = section.try_string("type").ok().flatten() else {
        warn!(
            target: "ability_core::prereq",
            ability = %owner,
            "Prerequisite section has no type, using none"
        );
        return Arc::new(NoneCheck);
    };

    match kind.to_ascii_lowercase().as_str() {
        "none" => Arc::new(NoneCheck),
        "level" => {
            let level = section.get_int("level", 1).clamp(0, i64::from(u32::MAX));
            Arc::new(LevelCheck::new(level as u32))
        }
        "resource" => {
            let name = section.get_string("resource", "");
            let Ok(resource) = ResourceKind::from_str(&name) else {
                warn!(
                    target: "ability_core::prereq",
                    ability = %owner,
                    resource = %name,
                    "Unknown resource in prerequisite, using none"
                );
                return Arc::new(NoneCheck);
            };
            let amount = section.get_int("amount", 0).clamp(0, i64::from(u32::MAX));
            Arc::new(ResourceCheck::new(resource, amount as u32))
        }
        "cooldown" => {
            let ability = section
                .try_string("ability")
                .ok()
                .flatten()
                .map(AbilityId::new)
                .unwrap_or_else(|| owner.clone());
            Arc::new(CooldownCheck::new(ability))
        }
        "composite" => {
            let mut composite = CompositeCheck::default();
            for name in section.get_string_list("prerequisites") {
                match section.section(&name) {
                    Some(child) => composite.push(parse(&child, owner, depth + 1)),
                    None => {
                        warn!(
                            target: "ability_core::prereq",
                            ability = %owner,
                            child = %name,
                            "Missing prerequisite subsection, using none"
                        );
                        composite.push(Arc::new(NoneCheck));
                    }
                }
            }
            Arc::new(composite)
        }
        other => {
            warn!(
                target: "ability_core::prereq",
                ability = %owner,
                kind = %other,
                "Unknown prerequisite type, using none"
            );
            Arc::new(NoneCheck)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSection;
    use crate::cooldown::CooldownTracker;
    use crate::prereq::CheckContext;
    use crate::prereq::testing::StaticActors;
    use crate::types::{ActorId, Tick};

    const ACTOR: ActorId = ActorId(3);

    fn owner() -> AbilityId {
        AbilityId::new("meteor")
    }

    #[test]
    fn composite_parses_named_children_in_order() {
        let section = ConfigSection::new()
            .with("type", "composite")
            .with("prerequisites", vec!["veteran", "focus"])
            .with("veteran.type", "level")
            .with("veteran.level", 20)
            .with("focus.type", "resource")
            .with("focus.resource", "mana")
            .with("focus.amount", 50);

        let check = from_config(&section, &owner());
        let cooldowns = CooldownTracker::new();

        let weak = StaticActors::default()
            .with_level(ACTOR, 25)
            .with_resource(ACTOR, ResourceKind::Mana, 10);
        let result = check.check(&CheckContext::new(ACTOR, Tick::ZERO, &weak, &cooldowns));
        assert_eq!(result.reason(), Some("You need 50 mana to cast this ability"));

        let ready = StaticActors::default()
            .with_level(ACTOR, 25)
            .with_resource(ACTOR, ResourceKind::Mana, 60);
        assert!(check.check(&CheckContext::new(ACTOR, Tick::ZERO, &ready, &cooldowns)).is_ok());
    }

    #[test]
    fn unknown_or_missing_type_defaults_to_none() {
        let cooldowns = CooldownTracker::new();
        let actors = StaticActors::default();
        let ctx = CheckContext::new(ACTOR, Tick::ZERO, &actors, &cooldowns);

        let unknown = from_config(&ConfigSection::new().with("type", "moon-phase"), &owner());
        assert!(unknown.check(&ctx).is_ok());

        let missing = from_config(&ConfigSection::new().with("level", 99), &owner());
        assert!(missing.check(&ctx).is_ok());
    }

    #[test]
    fn missing_composite_child_is_skipped() {
        let section = ConfigSection::new()
            .with("type", "composite")
            .with("prerequisites", vec!["ghost"]);
        let check = from_config(&section, &owner());

        let cooldowns = CooldownTracker::new();
        let actors = StaticActors::default();
        assert!(check.check(&CheckContext::new(ACTOR, Tick::ZERO, &actors, &cooldowns)).is_ok());
    }

    #[test]
    fn cooldown_type_defaults_to_owner() {
        let check = from_config(&ConfigSection::new().with("type", "cooldown"), &owner());
        let cooldowns = CooldownTracker::new();
        cooldowns.stamp(ACTOR, &owner(), Tick::ZERO, 20);
        let actors = StaticActors::default();

        let result = check.check(&CheckContext::new(ACTOR, Tick(5), &actors, &cooldowns));
        assert!(result.reason().is_some_and(|r| r.contains("cooldown")));
    }
}
