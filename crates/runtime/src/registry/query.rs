//! Filtered, sorted registry queries.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ability_core::{AbilityDefinition, AbilityId, AbilityInstance, AbilityKind, fold_case};
use serde::{Deserialize, Serialize};

/// Sort key for [`AbilityQuery`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortField {
    /// Display name, ignoring case.
    #[default]
    Name,
    Cooldown,
    /// Category, ignoring case.
    Category,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    #[strum(serialize = "asc", serialize = "ascending")]
    Ascending,
    #[strum(serialize = "desc", serialize = "descending")]
    Descending,
}

/// Registry query: filters, then sort, then limit.
///
/// Equal sort keys are ordered by ability id ascending, so results are
/// deterministic regardless of registration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityQuery {
    /// Exact category match, ignoring case.
    pub category: Option<String>,
    /// Display-name substring, ignoring case.
    pub name_contains: Option<String>,
    /// Inclusive upper bound on the base cooldown.
    pub max_cooldown: Option<Duration>,
    /// Tag match, ignoring case.
    pub tag: Option<String>,
    /// Inclusive bounds on the target range; an unbounded ability counts
    /// as infinitely long.
    pub min_range: Option<f64>,
    pub max_range: Option<f64>,
    /// Inclusive upper bound on the level the prerequisites demand.
    pub max_level: Option<u32>,
    pub sort: SortField,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl AbilityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn max_cooldown(mut self, cooldown: Duration) -> Self {
        self.max_cooldown = Some(cooldown);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min_range = Some(min);
        self.max_range = Some(max);
        self
    }

    /// Keeps abilities castable at `level`.
    pub fn max_level(mut self, level: u32) -> Self {
        self.max_level = Some(level);
        self
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort = field;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, instance: &AbilityInstance) -> bool {
        let def = instance.definition();
        if let Some(category) = &self.category
            && !def.in_category(category)
        {
            return false;
        }
        if let Some(needle) = &self.name_contains
            && !fold_case(&def.display_name).contains(&fold_case(needle))
        {
            return false;
        }
        if let Some(max) = self.max_cooldown
            && def.cooldown > max
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !def.has_tag(tag)
        {
            return false;
        }
        let reach = effective_range(def);
        if self.min_range.is_some_and(|min| reach < min)
            || self.max_range.is_some_and(|max| reach > max)
        {
            return false;
        }
        if let Some(level) = self.max_level
            && def.level_requirement() > level
        {
            return false;
        }
        true
    }

    fn compare(&self, a: &AbilityInstance, b: &AbilityInstance) -> Ordering {
        let (da, db) = (a.definition(), b.definition());
        let primary = match self.sort {
            SortField::Name => fold_case(&da.display_name).cmp(&fold_case(&db.display_name)),
            SortField::Cooldown => da.cooldown.cmp(&db.cooldown),
            SortField::Category => fold_case(&da.category).cmp(&fold_case(&db.category)),
        };
        let primary = match self.order {
            SortOrder::Ascending => primary,
            SortOrder::Descending => primary.reverse(),
        };
        primary.then_with(|| a.id().cmp(b.id()))
    }

    /// Applies the query to a candidate set.
    pub fn apply<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a Arc<AbilityInstance>>,
    ) -> Vec<Arc<AbilityInstance>> {
        let mut selected: Vec<Arc<AbilityInstance>> = candidates
            .into_iter()
            .filter(|instance| self.matches(instance))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn effective_range(def: &AbilityDefinition) -> f64 {
    if def.range > 0.0 { def.range } else { f64::INFINITY }
}

/// Serializable listing entry for external tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilitySummary {
    pub id: AbilityId,
    pub display_name: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cooldown_ms: u64,
    /// Zero means unbounded.
    pub range: f64,
    pub level_requirement: u32,
    pub kind: AbilityKind,
    pub toggleable: bool,
}

impl From<&AbilityInstance> for AbilitySummary {
    fn from(instance: &AbilityInstance) -> Self {
        let def = instance.definition();
        Self {
            id: def.id.clone(),
            display_name: def.display_name.clone(),
            category: def.category.clone(),
            tags: def.tags.clone(),
            cooldown_ms: u64::try_from(def.cooldown.as_millis()).unwrap_or(u64::MAX),
            range: def.range,
            level_requirement: def.level_requirement(),
            kind: instance.kind(),
            toggleable: def.is_toggleable(),
        }
    }
}
