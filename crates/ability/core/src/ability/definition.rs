use std::sync::Arc;
use std::time::Duration;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::{ConfigSection, FrameworkConfig};
use crate::prereq::Prerequisite;
use crate::types::{ResourceCost, Tick};

use super::AbilityId;

bitflags! {
    /// Boolean traits of an ability definition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AbilityFlags: u8 {
        /// Listed in the registry's toggleable index.
        const TOGGLEABLE    = 1 << 0;
        /// Effects may target the casting actor.
        const FRIENDLY_FIRE = 1 << 1;
    }
}

/// Shape of an ability's effect lifecycle.
///
/// Reported by behaviors for telemetry and listings only; the pipeline never
/// branches on it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityKind {
    /// Effects applied during compute.
    Instant,
    /// Effects resolved later through a tracked world object.
    Projectile,
    /// Effects applied by a repeating scheduled task.
    Channeled,
}

/// Immutable, fully-resolved description of an ability.
///
/// Produced by [`AbilityBuilder`](super::AbilityBuilder) from compiled
/// defaults merged with per-instance config; replaced wholesale on reload.
#[derive(Clone, Debug)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub display_name: String,
    pub description: String,
    pub category: String,
    /// Free-form labels, trimmed and deduplicated ignoring case.
    pub tags: Vec<String>,
    pub cooldown: Duration,
    pub cost: ArrayVec<ResourceCost, { FrameworkConfig::MAX_COSTS }>,
    /// Maximum target distance; zero means unbounded.
    pub range: f64,
    pub flags: AbilityFlags,
    /// Ability-specific eligibility checks, evaluated after the cooldown check.
    pub prerequisite: Arc<dyn Prerequisite>,
    /// Merged content settings (damage values, particle keys, ...).
    pub settings: ConfigSection,
}

impl AbilityDefinition {
    pub fn cooldown_ticks(&self) -> u64 {
        Tick::ticks_for(self.cooldown)
    }

    pub fn is_toggleable(&self) -> bool {
        self.flags.contains(AbilityFlags::TOGGLEABLE)
    }

    pub fn allows_friendly_fire(&self) -> bool {
        self.flags.contains(AbilityFlags::FRIENDLY_FIRE)
    }

    /// Returns true if the category matches, ignoring case.
    pub fn in_category(&self, category: &str) -> bool {
        fold_case(&self.category) == fold_case(category)
    }

    /// Returns true if any tag matches, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = fold_case(tag);
        self.tags.iter().any(|own| fold_case(own) == wanted)
    }

    /// Minimum actor level demanded by the prerequisites; zero when none.
    pub fn level_requirement(&self) -> u32 {
        self.prerequisite.min_level().unwrap_or(0)
    }

    pub fn in_range(&self, distance: f64) -> bool {
        self.range <= 0.0 || distance <= self.range
    }
}

/// Case folding shared by every category and tag comparison, including the
/// registry's derived indices.
pub fn fold_case(label: &str) -> String {
    label.to_lowercase()
}
