//! Common error infrastructure for ability-core.
//!
//! Each stage owns its error enum; this module holds the shared severity
//! classification and the errors that cross module boundaries.
//!
//! # Design Principles
//!
//! - **Never fatal on config**: configuration problems surface as
//!   [`ConfigError`] values that callers downgrade to warnings
//! - **User vs operator**: rejection reasons are short and human-readable,
//!   diagnostics stay in the error values and the operator log
//! - **Severity Classification**: errors are categorized for recovery strategies

use thiserror::Error;

use crate::ability::AbilityId;
use crate::config::ConfigValue;
use crate::types::{ActorId, ResourceKind};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions that may succeed on a later attempt
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all ability-core errors.
pub trait AbilityError: std::error::Error {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;
}

// ============================================================================
// Configuration
// ============================================================================

/// A present but unusable configuration value.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("config value at `{path}` is a {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("config value at `{path}` is invalid: {reason}")]
    Invalid { path: String, reason: String },

    #[error("unknown resource kind `{0}`")]
    UnknownResource(String),
}

impl ConfigError {
    pub fn type_mismatch(path: &str, expected: &'static str, found: &ConfigValue) -> Self {
        Self::TypeMismatch {
            path: path.to_owned(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}

impl AbilityError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }
}

// ============================================================================
// Ability construction
// ============================================================================

/// Failure to materialize an ability from its builder.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildError {
    #[error("`{0}` is not a valid ability id (expected kebab-case)")]
    InvalidId(String),

    #[error("ability {0} has an empty display name")]
    EmptyDisplayName(AbilityId),

    #[error("ability {id} has a negative cooldown ({millis} ms)")]
    NegativeCooldown { id: AbilityId, millis: i64 },

    #[error("ability {id} declares more than {max} resource costs")]
    TooManyCosts { id: AbilityId, max: usize },

    #[error("ability {id}: {source}")]
    Config {
        id: AbilityId,
        #[source]
        source: ConfigError,
    },
}

impl AbilityError for BuildError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }
}

// ============================================================================
// Cost deduction
// ============================================================================

/// Raised by the actor source when a deduction cannot be applied in full.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeductionError {
    #[error("need {required} {kind}, have {available}")]
    Insufficient {
        kind: ResourceKind,
        required: u32,
        available: u32,
    },

    #[error("actor {0} is not known to the host")]
    UnknownActor(ActorId),
}

impl AbilityError for DeductionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Insufficient { .. } => ErrorSeverity::Recoverable,
            Self::UnknownActor(_) => ErrorSeverity::Validation,
        }
    }
}

// ============================================================================
// Compute
// ============================================================================

/// Failure to spawn a tracked world object.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("projectile direction must be a finite, non-zero vector")]
    InvalidDirection,

    #[error("host refused to spawn the projectile")]
    HostRejected,

    #[error("too many tracked projectiles in flight")]
    CapacityExhausted,

    #[error("deferred effect service is shut down")]
    ShutDown,
}

impl AbilityError for LaunchError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidDirection => ErrorSeverity::Validation,
            Self::HostRejected | Self::CapacityExhausted => ErrorSeverity::Recoverable,
            Self::ShutDown => ErrorSeverity::Fatal,
        }
    }
}

/// Fault raised by an ability's compute or impact entrypoint.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ComputeError {
    #[error("ability requires a target")]
    MissingTarget,

    #[error("target is {distance:.1} away, range is {range:.1}")]
    OutOfRange { distance: f64, range: f64 },

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("{0}")]
    Failed(String),
}

impl ComputeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl AbilityError for ComputeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingTarget | Self::OutOfRange { .. } => ErrorSeverity::Recoverable,
            Self::Launch(inner) => inner.severity(),
            Self::Failed(_) => ErrorSeverity::Internal,
        }
    }
}
