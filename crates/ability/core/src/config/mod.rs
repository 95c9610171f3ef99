//! Configuration access and framework tunables.
//!
//! - [`ConfigValue`] / [`ConfigSection`]: the in-memory tree loaders produce
//! - [`ConfigReader`]: the read-only, default-tolerant access trait
//! - [`FrameworkConfig`]: framework-wide constants and defaults, optionally
//!   overridden from the `framework` section

mod reader;
mod value;

pub use reader::{ConfigReader, ConfigSection};
pub use value::{ConfigTable, ConfigValue};

/// Framework-wide tunables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameworkConfig {
    /// Ticks between sweeps of expired cooldown records.
    pub cooldown_sweep_interval: u64,
    /// Failsafe lifetime of a projectile that never reports an impact.
    pub projectile_lifetime: u64,
    /// Ticks before the first homing retarget.
    pub homing_delay: u64,
    /// Ticks between homing retargets.
    pub homing_period: u64,
    /// Failsafe lifetime of the homing task.
    pub homing_lifetime: u64,
    /// Search radius for homing targets.
    pub homing_radius: f64,
}

impl FrameworkConfig {
    // ===== compile-time constants =====
    /// Maximum number of distinct resource costs on a single ability.
    pub const MAX_COSTS: usize = 4;
    /// Cooldown applied when a builder does not set one.
    pub const DEFAULT_COOLDOWN_MS: u64 = 1000;
    /// Category applied when a builder does not set one.
    pub const DEFAULT_CATEGORY: &'static str = "misc";
    /// Config namespace holding per-ability override sections.
    pub const ABILITIES_SECTION: &'static str = "abilities";
    /// Config namespace holding framework overrides.
    pub const FRAMEWORK_SECTION: &'static str = "framework";

    pub const MIN_PROJECTILE_SPEED: f64 = 0.1;
    pub const MAX_PROJECTILE_SPEED: f64 = 10.0;
    pub const DEFAULT_PROJECTILE_SPEED: f64 = 2.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COOLDOWN_SWEEP_INTERVAL: u64 = 1200;
    pub const DEFAULT_PROJECTILE_LIFETIME: u64 = 300;
    pub const DEFAULT_HOMING_DELAY: u64 = 5;
    pub const DEFAULT_HOMING_PERIOD: u64 = 2;
    pub const DEFAULT_HOMING_LIFETIME: u64 = 100;
    pub const DEFAULT_HOMING_RADIUS: f64 = 20.0;

    pub fn new() -> Self {
        Self {
            cooldown_sweep_interval: Self::DEFAULT_COOLDOWN_SWEEP_INTERVAL,
            projectile_lifetime: Self::DEFAULT_PROJECTILE_LIFETIME,
            homing_delay: Self::DEFAULT_HOMING_DELAY,
            homing_period: Self::DEFAULT_HOMING_PERIOD,
            homing_lifetime: Self::DEFAULT_HOMING_LIFETIME,
            homing_radius: Self::DEFAULT_HOMING_RADIUS,
        }
    }

    /// Reads overrides from the `framework` section, keeping defaults for
    /// anything missing, mistyped or non-positive.
    pub fn from_reader(config: &dyn ConfigReader) -> Self {
        let defaults = Self::new();
        let Some(section) = config.section(Self::FRAMEWORK_SECTION) else {
            return defaults;
        };

        let ticks = |key: &str, default: u64| -> u64 {
            u64::try_from(section.get_int(key, default as i64))
                .ok()
                .filter(|&v| v > 0)
                .unwrap_or(default)
        };
        let radius = section.get_double("homing-radius", defaults.homing_radius);

        Self {
            cooldown_sweep_interval: ticks(
                "cooldown-sweep-interval",
                defaults.cooldown_sweep_interval,
            ),
            projectile_lifetime: ticks("projectile-lifetime", defaults.projectile_lifetime),
            homing_delay: ticks("homing-delay", defaults.homing_delay),
            homing_period: ticks("homing-period", defaults.homing_period),
            homing_lifetime: ticks("homing-lifetime", defaults.homing_lifetime),
            homing_radius: if radius.is_finite() && radius > 0.0 {
                radius
            } else {
                defaults.homing_radius
            },
        }
    }

    /// Path of the override section for one ability.
    pub fn ability_section_path(id: &str) -> String {
        format!("{}.{}", Self::ABILITIES_SECTION, id)
    }
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_overrides_ignore_invalid_values() {
        let config = ConfigSection::new()
            .with("framework.homing-period", 4)
            .with("framework.homing-delay", -3)
            .with("framework.homing-radius", "far");

        let framework = FrameworkConfig::from_reader(&config);

        assert_eq!(framework.homing_period, 4);
        assert_eq!(framework.homing_delay, FrameworkConfig::DEFAULT_HOMING_DELAY);
        assert_eq!(framework.homing_radius, FrameworkConfig::DEFAULT_HOMING_RADIUS);
        assert_eq!(
            framework.cooldown_sweep_interval,
            FrameworkConfig::DEFAULT_COOLDOWN_SWEEP_INTERVAL
        );
    }
}
