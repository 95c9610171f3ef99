//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from engine wiring and worker coordination so clients can
//! bubble them up with consistent context. Cast rejections are not errors;
//! they come back as [`CastOutcome`](crate::CastOutcome) values.
use ability_core::{AbilityError, BuildError, ErrorSeverity};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("engine requires a {0} before building")]
    MissingHost(&'static str),

    #[error("ability {ability} failed to build from compiled defaults")]
    InvalidAbility {
        ability: String,
        #[source]
        source: BuildError,
    },

    #[error("tick worker command channel closed")]
    CommandChannelClosed,

    #[error("tick worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("tick worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl AbilityError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingHost(_) | Self::InvalidAbility { .. } => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) => ErrorSeverity::Fatal,
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }
}
