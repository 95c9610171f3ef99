//! Cast states, outcomes and user-facing rejections.

use ability_core::{
    AbilityError, AbilityId, ActorId, ComputeError, ErrorSeverity, ObjectHandle, ResourceKind,
    TaskHandle,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic message shown to the actor when compute faults.
pub const FAULT_MESSAGE: &str = "Ability casting failed.";

/// States of the cast state machine.
///
/// ```text
/// Requested → PrereqChecked → Rejected
///                           → CostApplied → Computing → EffectApplied
///                                                     → HandleIssued
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CastState {
    Requested,
    PrereqChecked,
    Rejected,
    CostApplied,
    Computing,
    /// Terminal for instant abilities.
    EffectApplied,
    /// Terminal for the pipeline; a projectile or channel carries on.
    HandleIssued,
}

impl CastState {
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::EffectApplied | Self::HandleIssued
        )
    }
}

/// Why a cast was turned down before any side effect.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("Unknown ability: {0}")]
    UnknownAbility(String),

    #[error("You cannot cast abilities right now")]
    ActorUnavailable(ActorId),

    /// Failed prerequisite; carries the check's own reason.
    #[error("{0}")]
    Prerequisite(String),

    #[error("You need {required} {kind} to cast this ability")]
    InsufficientResource {
        kind: ResourceKind,
        required: u32,
        available: u32,
    },
}

impl Rejection {
    /// Short text shown to the actor.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl AbilityError for Rejection {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientResource { .. } => ErrorSeverity::Recoverable,
            Self::Prerequisite(_) => ErrorSeverity::Recoverable,
            Self::UnknownAbility(_) | Self::ActorUnavailable(_) => ErrorSeverity::Validation,
        }
    }
}

/// Result of one cast attempt.
#[derive(Debug)]
pub enum CastOutcome {
    /// Instant effects applied.
    Applied { ability: AbilityId },
    /// A projectile was launched; its impact resolves later.
    Deferred {
        ability: AbilityId,
        handle: ObjectHandle,
    },
    /// A repeating task keeps applying effects.
    Channeling {
        ability: AbilityId,
        task: TaskHandle,
    },
    /// Turned down before cost was taken.
    Rejected(Rejection),
    /// Compute failed after cost was taken; the cooldown was stamped and the
    /// cost kept.
    Faulted {
        ability: AbilityId,
        error: ComputeError,
    },
}

impl CastOutcome {
    /// Terminal state reached by the cast.
    pub fn state(&self) -> CastState {
        match self {
            Self::Applied { .. } => CastState::EffectApplied,
            // Cost and cooldown are committed exactly as for an applied effect.
            Self::Faulted { .. } => CastState::EffectApplied,
            Self::Deferred { .. } | Self::Channeling { .. } => CastState::HandleIssued,
            Self::Rejected(_) => CastState::Rejected,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Applied { .. } | Self::Deferred { .. } | Self::Channeling { .. }
        )
    }

    pub fn ability(&self) -> Option<&AbilityId> {
        match self {
            Self::Applied { ability }
            | Self::Deferred { ability, .. }
            | Self::Channeling { ability, .. }
            | Self::Faulted { ability, .. } => Some(ability),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Message for the actor, if the cast did not succeed.
    ///
    /// Internal faults get a generic text; details stay in the operator log.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Rejected(rejection) => Some(rejection.user_message()),
            Self::Faulted { error, .. } if error.severity().is_internal() => {
                Some(FAULT_MESSAGE.to_owned())
            }
            Self::Faulted { error, .. } => Some(error.to_string()),
            _ => None,
        }
    }
}
