use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::BuildError;

/// Stable, globally unique ability identifier (kebab-case by convention).
///
/// Cloning is cheap; the string is shared.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbilityId(Arc<str>);

impl AbilityId {
    /// Wraps an identifier without validating it.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Validates the kebab-case convention: lowercase ASCII letters, digits
    /// and single interior hyphens.
    pub fn parse(id: &str) -> Result<Self, BuildError> {
        let valid = !id.is_empty()
            && !id.starts_with('-')
            && !id.ends_with('-')
            && !id.contains("--")
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');

        if valid {
            Ok(Self::new(id))
        } else {
            Err(BuildError::InvalidId(id.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbilityId({})", &self.0)
    }
}

impl Borrow<str> for AbilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AbilityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AbilityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AbilityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_kebab_case_only() {
        assert!(AbilityId::parse("fireball").is_ok());
        assert!(AbilityId::parse("homing-rockets-2").is_ok());
        assert!(AbilityId::parse("Fireball").is_err());
        assert!(AbilityId::parse("fire_ball").is_err());
        assert!(AbilityId::parse("-fire").is_err());
        assert!(AbilityId::parse("fire--ball").is_err());
        assert!(AbilityId::parse("").is_err());
    }
}
