//! Dynamically typed configuration tree.

use std::collections::BTreeMap;

/// Configuration table keyed by segment name.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single node of a configuration tree.
///
/// Loaders (TOML files, host settings stores) convert their native
/// representation into this tree; framework code only reads it through
/// [`ConfigReader`](super::ConfigReader).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Table(ConfigTable),
}

impl ConfigValue {
    /// Short type label used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Table(_) => "table",
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Walks a dotted path (`"abilities.fireball.cooldown-ms"`) down nested tables.
    pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |node, segment| node.as_table()?.get(segment))
    }

    /// Deep-merges `other` into `self`; tables merge key by key, any other
    /// value in `other` replaces the existing one.
    pub fn merge(&mut self, other: &ConfigValue) {
        match (self, other) {
            (Self::Table(base), Self::Table(overlay)) => {
                for (key, value) in overlay {
                    match base.get_mut(key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            (slot, value) => *slot = value.clone(),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ConfigValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ConfigTable> for ConfigValue {
    fn from(table: ConfigTable) -> Self {
        Self::Table(table)
    }
}
