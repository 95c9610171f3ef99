//! Read-only, default-tolerant access to configuration trees.

use std::sync::Arc;

use super::value::{ConfigTable, ConfigValue};
use crate::error::ConfigError;

/// Typed access to nested key/value configuration.
///
/// Every path may be absent. The lenient getters always return the supplied
/// default on a missing or mistyped value; the `try_*` variants report a
/// mistyped value as [`ConfigError::TypeMismatch`] so builders can reject a
/// malformed section without failing on a missing one.
pub trait ConfigReader: Send + Sync {
    /// Raw node at a dotted path.
    fn value(&self, path: &str) -> Option<&ConfigValue>;

    /// Sub-reader rooted at `path`, or `None` if the path is not a table.
    fn section(&self, path: &str) -> Option<ConfigSection> {
        self.value(path)
            .and_then(ConfigValue::as_table)
            .map(|table| ConfigSection::from_table(table.clone()))
    }

    /// Immediate child keys of the root, in sorted order.
    fn keys(&self) -> Vec<String> {
        self.value("")
            .and_then(ConfigValue::as_table)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn contains(&self, path: &str) -> bool {
        self.value(path).is_some()
    }

    // ===== lenient getters =====

    fn get_double(&self, path: &str, default: f64) -> f64 {
        self.try_double(path).ok().flatten().unwrap_or(default)
    }

    fn get_int(&self, path: &str, default: i64) -> i64 {
        self.try_int(path).ok().flatten().unwrap_or(default)
    }

    fn get_boolean(&self, path: &str, default: bool) -> bool {
        self.try_bool(path).ok().flatten().unwrap_or(default)
    }

    fn get_string(&self, path: &str, default: &str) -> String {
        self.try_string(path)
            .ok()
            .flatten()
            .unwrap_or_else(|| default.to_owned())
    }

    /// String list at `path`; non-string entries are skipped, a missing path
    /// yields an empty list.
    fn get_string_list(&self, path: &str) -> Vec<String> {
        match self.value(path) {
            Some(ConfigValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    ConfigValue::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            Some(ConfigValue::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }

    // ===== strict getters =====

    fn try_double(&self, path: &str) -> Result<Option<f64>, ConfigError> {
        match self.value(path) {
            None => Ok(None),
            Some(ConfigValue::Float(f)) => Ok(Some(*f)),
            Some(ConfigValue::Integer(i)) => Ok(Some(*i as f64)),
            Some(other) => Err(ConfigError::type_mismatch(path, "number", other)),
        }
    }

    fn try_int(&self, path: &str) -> Result<Option<i64>, ConfigError> {
        match self.value(path) {
            None => Ok(None),
            Some(ConfigValue::Integer(i)) => Ok(Some(*i)),
            Some(ConfigValue::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(Some(*f as i64)),
            Some(other) => Err(ConfigError::type_mismatch(path, "integer", other)),
        }
    }

    fn try_bool(&self, path: &str) -> Result<Option<bool>, ConfigError> {
        match self.value(path) {
            None => Ok(None),
            Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(ConfigError::type_mismatch(path, "boolean", other)),
        }
    }

    fn try_string(&self, path: &str) -> Result<Option<String>, ConfigError> {
        match self.value(path) {
            None => Ok(None),
            Some(ConfigValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ConfigError::type_mismatch(path, "string", other)),
        }
    }

    /// A single string counts as a one-element list.
    fn try_string_list(&self, path: &str) -> Result<Option<Vec<String>>, ConfigError> {
        match self.value(path) {
            None => Ok(None),
            Some(ConfigValue::String(single)) => Ok(Some(vec![single.clone()])),
            Some(ConfigValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    ConfigValue::String(s) => Ok(s.clone()),
                    other => Err(ConfigError::type_mismatch(path, "string list", other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(ConfigError::type_mismatch(path, "string list", other)),
        }
    }
}

// ============================================================================
// ConfigSection
// ============================================================================

/// In-memory configuration tree implementing [`ConfigReader`].
///
/// Cheap to clone; the tree is shared until mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSection {
    root: Arc<ConfigValue>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::from_table(ConfigTable::new())
    }

    pub fn from_table(table: ConfigTable) -> Self {
        Self {
            root: Arc::new(ConfigValue::Table(table)),
        }
    }

    /// Sets `value` at a dotted path, creating intermediate tables and
    /// replacing any non-table node in the way.
    pub fn insert(&mut self, path: &str, value: impl Into<ConfigValue>) {
        let mut node = Arc::make_mut(&mut self.root);
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if !matches!(node, ConfigValue::Table(_)) {
                *node = ConfigValue::Table(ConfigTable::new());
            }
            let ConfigValue::Table(table) = node else {
                return;
            };
            if segments.peek().is_none() {
                table.insert(segment.to_owned(), value.into());
                return;
            }
            node = table
                .entry(segment.to_owned())
                .or_insert_with(|| ConfigValue::Table(ConfigTable::new()));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<ConfigValue>) -> Self {
        self.insert(path, value);
        self
    }

    /// Deep-merges an overlay tree over this one.
    pub fn merge(&mut self, overlay: &ConfigValue) {
        Arc::make_mut(&mut self.root).merge(overlay);
    }

    /// The whole tree as a single table node.
    pub fn as_value(&self) -> &ConfigValue {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_table().is_none_or(ConfigTable::is_empty)
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigReader for ConfigSection {
    fn value(&self, path: &str) -> Option<&ConfigValue> {
        self.root.lookup(path)
    }
}

impl From<ConfigTable> for ConfigSection {
    fn from(table: ConfigTable) -> Self {
        Self::from_table(table)
    }
}
