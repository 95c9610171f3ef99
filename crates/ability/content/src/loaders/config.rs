//! TOML configuration loader.

use std::path::Path;

use ability_core::{ConfigSection, ConfigTable, ConfigValue};

use crate::loaders::{LoadResult, read_file};

/// Loader for ability configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration tree from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a TOML file with `[framework]` and `[abilities.<id>]` tables
    pub fn load(path: &Path) -> LoadResult<ConfigSection> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Load `base` and deep-merge every existing file of `overlays` over it.
    ///
    /// Missing overlay files are skipped; a present but malformed one is an error.
    pub fn load_layered(base: &Path, overlays: &[&Path]) -> LoadResult<ConfigSection> {
        let mut config = Self::load(base)?;
        for overlay in overlays {
            if !overlay.exists() {
                continue;
            }
            let layer = Self::load(overlay)?;
            config.merge(layer.as_value());
            tracing::debug!(
                target: "ability_content::loaders",
                path = %overlay.display(),
                "merged config overlay"
            );
        }
        Ok(config)
    }

    /// Parse TOML text into a configuration tree.
    pub fn parse(content: &str) -> LoadResult<ConfigSection> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(ConfigSection::from_table(convert_table(table)))
    }
}

fn convert_table(table: toml::Table) -> ConfigTable {
    table
        .into_iter()
        .map(|(key, value)| (key, convert_value(value)))
        .collect()
}

fn convert_value(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => {
            ConfigValue::List(items.into_iter().map(convert_value).collect())
        }
        toml::Value::Table(table) => ConfigValue::Table(convert_table(table)),
    }
}

#[cfg(test)]
mod tests {
    use ability_core::ConfigReader;

    use super::*;

    const SAMPLE: &str = r#"
[framework]
projectile-lifetime = 600

[abilities.fireball]
cooldown-ms = 4000
damage = 9.5
cost = { mana = 25 }

[abilities.fireball.prerequisite]
type = "level"
level = 3
"#;

    #[test]
    fn parses_nested_tables_into_sections() {
        let Ok(config) = ConfigLoader::parse(SAMPLE) else {
            panic!("sample must parse");
        };

        assert_eq!(config.get_int("framework.projectile-lifetime", 0), 600);
        assert_eq!(config.get_int("abilities.fireball.cooldown-ms", 0), 4000);
        assert_eq!(config.get_double("abilities.fireball.damage", 0.0), 9.5);
        assert_eq!(config.get_int("abilities.fireball.cost.mana", 0), 25);
        assert_eq!(
            config.get_string("abilities.fireball.prerequisite.type", ""),
            "level"
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ConfigLoader::parse("[abilities\nbroken").is_err());
    }

    #[test]
    fn overlays_merge_over_the_base_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("abilities.toml");
        let local = dir.path().join("abilities.local.toml");
        let absent = dir.path().join("missing.toml");
        std::fs::write(&base, SAMPLE).expect("write base");
        std::fs::write(&local, "[abilities.fireball]\ncooldown-ms = 2500\n").expect("write overlay");

        let config = ConfigLoader::load_layered(&base, &[&local, &absent]).expect("layered load");

        assert_eq!(config.get_int("abilities.fireball.cooldown-ms", 0), 2500);
        assert_eq!(config.get_double("abilities.fireball.damage", 0.0), 9.5);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = ConfigLoader::load(Path::new("/nonexistent/abilities.toml"))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("/nonexistent/abilities.toml"));
    }
}
