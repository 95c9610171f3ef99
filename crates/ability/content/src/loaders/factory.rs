//! Content factory for loading ability configuration from a data directory.

use std::path::{Path, PathBuf};

use ability_core::{ConfigSection, FrameworkConfig};

use crate::loaders::{ConfigLoader, LoadResult};

/// Factory for loading configuration from a data directory.
///
/// Expects the following layout:
/// ```text
/// data/
/// ├── abilities.toml          # [framework] and [abilities.<id>] sections
/// └── abilities.local.toml    # optional operator overrides
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "abilities.toml";
    pub const LOCAL_OVERRIDES_FILE: &'static str = "abilities.local.toml";

    /// Create a new ContentFactory with the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the configuration tree with local overrides applied.
    ///
    /// A missing `abilities.toml` yields an empty tree, so every ability
    /// falls back to its compiled defaults.
    pub fn load_config(&self) -> LoadResult<ConfigSection> {
        let base = self.data_dir.join(Self::CONFIG_FILE);
        let local = self.data_dir.join(Self::LOCAL_OVERRIDES_FILE);
        if !base.exists() {
            tracing::warn!(
                target: "ability_content::loaders",
                path = %base.display(),
                "config file not found, using compiled defaults"
            );
            return Ok(ConfigSection::new());
        }
        ConfigLoader::load_layered(&base, &[local.as_path()])
    }

    /// Framework tunables read from the loaded tree.
    pub fn load_framework_config(&self) -> LoadResult<FrameworkConfig> {
        let config = self.load_config()?;
        Ok(FrameworkConfig::from_reader(&config))
    }
}

#[cfg(test)]
mod tests {
    use ability_core::ConfigReader;

    use super::*;

    #[test]
    fn missing_data_dir_yields_empty_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let factory = ContentFactory::new(dir.path().join("absent"));

        let config = factory.load_config().expect("empty config");
        assert!(config.is_empty());
        assert_eq!(
            factory.load_framework_config().expect("defaults"),
            FrameworkConfig::default()
        );
    }

    #[test]
    fn local_overrides_win() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(ContentFactory::CONFIG_FILE),
            "[framework]\nhoming-period = 3\n[abilities.heal]\namount = 6.0\n",
        )
        .expect("write base");
        std::fs::write(
            dir.path().join(ContentFactory::LOCAL_OVERRIDES_FILE),
            "[abilities.heal]\namount = 9.0\n",
        )
        .expect("write local");

        let factory = ContentFactory::new(dir.path());
        let config = factory.load_config().expect("config");

        assert_eq!(config.get_double("abilities.heal.amount", 0.0), 9.0);
        assert_eq!(factory.load_framework_config().expect("framework").homing_period, 3);
    }
}
