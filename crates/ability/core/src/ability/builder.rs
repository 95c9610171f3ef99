//! Builder materializing immutable ability instances.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use arrayvec::ArrayVec;

use crate::config::{ConfigReader, ConfigSection, ConfigValue, FrameworkConfig};
use crate::error::{BuildError, ConfigError};
use crate::prereq::{self, NoneCheck, Prerequisite};
use crate::types::{ResourceCost, ResourceKind};

use super::definition::fold_case;
use super::{AbilityBehavior, AbilityDefinition, AbilityFlags, AbilityId, AbilityKind};

/// Declarative template for an ability.
///
/// The builder keeps compiled defaults; [`build_with`](Self::build_with)
/// merges a per-instance config section over them without altering the
/// template, so the same builder can be re-materialized on every reload.
///
/// Defaults: cooldown 1000 ms, category `"misc"`, no cost, unbounded range,
/// no prerequisites, display name derived from the id.
#[derive(Clone)]
pub struct AbilityBuilder {
    id: String,
    display_name: Option<String>,
    description: String,
    category: String,
    tags: Vec<String>,
    cooldown_ms: i64,
    cost: Vec<ResourceCost>,
    range: f64,
    flags: AbilityFlags,
    prerequisite: Option<Arc<dyn Prerequisite>>,
    behavior: Arc<dyn AbilityBehavior>,
    settings: ConfigSection,
}

impl AbilityBuilder {
    pub fn new(id: impl Into<String>, behavior: impl AbilityBehavior + 'static) -> Self {
        Self::with_behavior(id, Arc::new(behavior))
    }

    pub fn with_behavior(id: impl Into<String>, behavior: Arc<dyn AbilityBehavior>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            description: String::new(),
            category: FrameworkConfig::DEFAULT_CATEGORY.to_owned(),
            tags: Vec::new(),
            cooldown_ms: FrameworkConfig::DEFAULT_COOLDOWN_MS as i64,
            cost: Vec::new(),
            range: 0.0,
            flags: AbilityFlags::empty(),
            prerequisite: None,
            behavior,
            settings: ConfigSection::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Cooldown in milliseconds. Negative values are rejected at build time.
    pub fn cooldown_ms(mut self, millis: i64) -> Self {
        self.cooldown_ms = millis;
        self
    }

    pub fn cooldown(self, cooldown: Duration) -> Self {
        let millis = i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX);
        self.cooldown_ms(millis)
    }

    /// Sets the cost for one resource kind; zero removes it.
    pub fn cost(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.set_cost(kind, amount);
        self
    }

    pub fn range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn toggleable(mut self, enabled: bool) -> Self {
        self.flags.set(AbilityFlags::TOGGLEABLE, enabled);
        self
    }

    pub fn friendly_fire(mut self, enabled: bool) -> Self {
        self.flags.set(AbilityFlags::FRIENDLY_FIRE, enabled);
        self
    }

    pub fn prerequisite(mut self, prerequisite: impl Prerequisite + 'static) -> Self {
        self.prerequisite = Some(Arc::new(prerequisite));
        self
    }

    /// Compiled default for a content setting (e.g. `"damage"`).
    pub fn setting(mut self, path: &str, value: impl Into<ConfigValue>) -> Self {
        self.settings.insert(path, value);
        self
    }

    /// Materializes the compiled defaults.
    pub fn build(&self) -> Result<AbilityInstance, BuildError> {
        self.materialize(None)
    }

    /// Materializes compiled defaults merged with `overrides`.
    ///
    /// A present but malformed key fails the whole build; absent keys keep
    /// their defaults.
    pub fn build_with(&self, overrides: &dyn ConfigReader) -> Result<AbilityInstance, BuildError> {
        self.materialize(Some(overrides))
    }

    fn materialize(
        &self,
        overrides: Option<&dyn ConfigReader>,
    ) -> Result<AbilityInstance, BuildError> {
        let id = AbilityId::parse(&self.id)?;
        let mut draft = self.clone();
        if let Some(overrides) = overrides {
            draft
                .apply_overrides(&id, overrides)
                .map_err(|source| BuildError::Config {
                    id: id.clone(),
                    source,
                })?;
        }

        if draft.cooldown_ms < 0 {
            return Err(BuildError::NegativeCooldown {
                id,
                millis: draft.cooldown_ms,
            });
        }
        let display_name = draft
            .display_name
            .take()
            .unwrap_or_else(|| title_case(id.as_str()));
        if display_name.trim().is_empty() {
            return Err(BuildError::EmptyDisplayName(id));
        }
        let cost = ArrayVec::try_from(draft.cost.as_slice()).map_err(|_| {
            BuildError::TooManyCosts {
                id: id.clone(),
                max: FrameworkConfig::MAX_COSTS,
            }
        })?;
        let category = match draft.category.trim() {
            "" => FrameworkConfig::DEFAULT_CATEGORY.to_owned(),
            trimmed => trimmed.to_owned(),
        };

        let definition = AbilityDefinition {
            id,
            display_name,
            description: draft.description,
            category,
            tags: normalize_tags(draft.tags),
            cooldown: Duration::from_millis(draft.cooldown_ms.unsigned_abs()),
            cost,
            range: if draft.range.is_finite() { draft.range.max(0.0) } else { 0.0 },
            flags: draft.flags,
            prerequisite: draft.prerequisite.unwrap_or_else(|| Arc::new(NoneCheck)),
            settings: draft.settings,
        };

        Ok(AbilityInstance {
            definition,
            behavior: Arc::clone(&self.behavior),
            template: self.clone(),
        })
    }

    fn apply_overrides(
        &mut self,
        id: &AbilityId,
        config: &dyn ConfigReader,
    ) -> Result<(), ConfigError> {
        if let Some(name) = config.try_string("display-name")? {
            self.display_name = Some(name);
        }
        if let Some(description) = config.try_string("description")? {
            self.description = description;
        }
        if let Some(category) = config.try_string("category")? {
            self.category = category;
        }
        if let Some(tags) = config.try_string_list("tags")? {
            self.tags = tags;
        }
        if let Some(millis) = config.try_int("cooldown-ms")? {
            self.cooldown_ms = millis;
        }
        if let Some(range) = config.try_double("range")? {
            if !range.is_finite() || range < 0.0 {
                return Err(ConfigError::invalid("range", "must be a non-negative number"));
            }
            self.range = range;
        }
        if let Some(enabled) = config.try_bool("toggleable")? {
            self.flags.set(AbilityFlags::TOGGLEABLE, enabled);
        }
        if let Some(enabled) = config.try_bool("friendly-fire")? {
            self.flags.set(AbilityFlags::FRIENDLY_FIRE, enabled);
        }

        match config.section("cost") {
            Some(costs) => {
                for key in costs.keys() {
                    let kind = ResourceKind::from_str(&key)
                        .map_err(|_| ConfigError::UnknownResource(key.clone()))?;
                    let amount = costs.try_int(&key)?.unwrap_or(0);
                    let amount = u32::try_from(amount).map_err(|_| {
                        ConfigError::invalid(&format!("cost.{key}"), "must be a non-negative integer")
                    })?;
                    self.set_cost(kind, amount);
                }
            }
            None => {
                if let Some(other) = config.value("cost") {
                    return Err(ConfigError::type_mismatch("cost", "table", other));
                }
            }
        }

        if let Some(section) = config.section("prerequisite") {
            self.prerequisite = Some(prereq::from_config(&section, id));
        }

        if let Some(root) = config.value("") {
            self.settings.merge(root);
        }
        Ok(())
    }

    fn set_cost(&mut self, kind: ResourceKind, amount: u32) {
        self.cost.retain(|cost| cost.kind != kind);
        if amount > 0 {
            self.cost.push(ResourceCost::new(kind, amount));
        }
    }
}

impl fmt::Debug for AbilityBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityBuilder")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("cooldown_ms", &self.cooldown_ms)
            .field("kind", &self.behavior.kind())
            .finish_non_exhaustive()
    }
}

/// Trims, drops blanks and keeps the first spelling of each tag.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty() && seen.insert(fold_case(tag)))
        .collect()
}

/// `"homing-rockets"` → `"Homing Rockets"`.
fn title_case(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// AbilityInstance
// ============================================================================

/// Registered ability: an immutable definition plus its compute behavior.
///
/// Keeps the builder it came from so a reload can re-materialize it.
#[derive(Clone)]
pub struct AbilityInstance {
    definition: AbilityDefinition,
    behavior: Arc<dyn AbilityBehavior>,
    template: AbilityBuilder,
}

impl AbilityInstance {
    pub fn id(&self) -> &AbilityId {
        &self.definition.id
    }

    pub fn definition(&self) -> &AbilityDefinition {
        &self.definition
    }

    pub fn behavior(&self) -> &dyn AbilityBehavior {
        self.behavior.as_ref()
    }

    pub fn kind(&self) -> AbilityKind {
        self.behavior.kind()
    }

    pub fn template(&self) -> &AbilityBuilder {
        &self.template
    }
}

impl fmt::Debug for AbilityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityInstance")
            .field("definition", &self.definition)
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{CastContext, Computed};
    use crate::error::ComputeError;
    use crate::prereq::LevelCheck;

    struct Inert;

    impl AbilityBehavior for Inert {
        fn kind(&self) -> AbilityKind {
            AbilityKind::Instant
        }

        fn compute(&self, _ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError> {
            Ok(Computed::Applied)
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let instance = AbilityBuilder::new("homing-rockets", Inert).build();
        let Ok(instance) = instance else {
            panic!("builder defaults must build");
        };
        let def = instance.definition();

        assert_eq!(def.display_name, "Homing Rockets");
        assert_eq!(def.category, "misc");
        assert_eq!(def.cooldown, Duration::from_millis(1000));
        assert_eq!(def.cooldown_ticks(), 20);
        assert!(def.cost.is_empty());
        assert!(!def.is_toggleable());
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let result = AbilityBuilder::new("spark", Inert).cooldown_ms(-5).build();
        assert!(matches!(result, Err(BuildError::NegativeCooldown { millis: -5, .. })));
    }

    #[test]
    fn invalid_id_is_rejected() {
        let result = AbilityBuilder::new("Spark", Inert).build();
        assert!(matches!(result, Err(BuildError::InvalidId(_))));
    }

    #[test]
    fn overrides_merge_over_compiled_defaults() {
        let builder = AbilityBuilder::new("fireball", Inert)
            .category("fire")
            .cooldown_ms(5000)
            .cost(ResourceKind::Mana, 20)
            .setting("damage", 6.0);
        let overrides = ConfigSection::new()
            .with("display-name", "Greater Fireball")
            .with("cooldown-ms", 8000)
            .with("cost.mana", 35)
            .with("cost.stamina", 5)
            .with("damage", 9.5)
            .with("prerequisite.type", "level")
            .with("prerequisite.level", 10);

        let Ok(instance) = builder.build_with(&overrides) else {
            panic!("valid overrides must build");
        };
        let def = instance.definition();

        assert_eq!(def.display_name, "Greater Fireball");
        assert_eq!(def.category, "fire");
        assert_eq!(def.cooldown, Duration::from_millis(8000));
        assert!(def.cost.contains(&ResourceCost::new(ResourceKind::Mana, 35)));
        assert!(def.cost.contains(&ResourceCost::new(ResourceKind::Stamina, 5)));
        assert_eq!(def.settings.get_double("damage", 0.0), 9.5);
        assert!(format!("{:?}", def.prerequisite).contains("LevelCheck"));

        // Template is untouched.
        let Ok(again) = instance.template().build() else {
            panic!("template must still build");
        };
        assert_eq!(again.definition().cooldown, Duration::from_millis(5000));
    }

    #[test]
    fn malformed_override_fails_the_build() {
        let builder = AbilityBuilder::new("fireball", Inert).prerequisite(LevelCheck::new(3));

        let mistyped = ConfigSection::new().with("cooldown-ms", "fast");
        assert!(matches!(
            builder.build_with(&mistyped),
            Err(BuildError::Config { .. })
        ));

        let unknown_resource = ConfigSection::new().with("cost.lucidity", 3);
        assert!(matches!(
            builder.build_with(&unknown_resource),
            Err(BuildError::Config {
                source: ConfigError::UnknownResource(_),
                ..
            })
        ));
    }

    #[test]
    fn tags_are_normalized_and_overridable() {
        let builder = AbilityBuilder::new("frost-lance", Inert)
            .tags(["Ranged", " ice ", "ranged", ""])
            .prerequisite(LevelCheck::new(7));

        let Ok(instance) = builder.build() else {
            panic!("builder defaults must build");
        };
        let def = instance.definition();
        assert_eq!(def.tags, vec!["Ranged".to_owned(), "ice".to_owned()]);
        assert!(def.has_tag("RANGED"));
        assert!(!def.has_tag("fire"));
        assert_eq!(def.level_requirement(), 7);

        let overrides = ConfigSection::new().with("tags", vec!["aoe", "Éclat"]);
        let Ok(tuned) = builder.build_with(&overrides) else {
            panic!("string list override must build");
        };
        assert_eq!(tuned.definition().tags, vec!["aoe".to_owned(), "Éclat".to_owned()]);
        assert!(tuned.definition().has_tag("éCLAT"));

        let mistyped = ConfigSection::new().with("tags", vec![1, 2]);
        assert!(matches!(
            builder.build_with(&mistyped),
            Err(BuildError::Config { .. })
        ));
    }

    #[test]
    fn category_match_folds_non_ascii_case() {
        let Ok(instance) = AbilityBuilder::new("aether", Inert).category("Éther").build() else {
            panic!("builder defaults must build");
        };

        assert!(instance.definition().in_category("éther"));
        assert!(instance.definition().in_category("ÉTHER"));
        assert_eq!(instance.definition().level_requirement(), 0);
    }
}
