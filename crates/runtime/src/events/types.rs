//! Event payloads for each topic.

use ability_core::{AbilityId, ActorId, ObjectHandle, Tick};
use serde::{Deserialize, Serialize};

use crate::pipeline::CastState;

/// Outcome of a cast request, as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CastEvent {
    /// The cast reached a successful terminal state.
    Succeeded {
        actor: ActorId,
        ability: AbilityId,
        state: CastState,
        tick: Tick,
    },

    /// The cast was turned down before any side effect.
    ///
    /// `ability` is the requested id and may not be registered.
    Rejected {
        actor: ActorId,
        ability: String,
        reason: String,
        tick: Tick,
    },

    /// Compute failed after cost was taken.
    Faulted {
        actor: ActorId,
        ability: AbilityId,
        error: String,
        tick: Tick,
    },
}

/// Deferred-effect lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    /// A projectile was launched.
    Launched {
        owner: ActorId,
        ability: AbilityId,
        object: ObjectHandle,
        tick: Tick,
    },

    /// An impact was applied to the world.
    ImpactResolved {
        ability: AbilityId,
        object: ObjectHandle,
        /// False when the owner was offline and only environmental effects ran.
        attributed: bool,
        tick: Tick,
    },

    /// A collision callback was ignored (duplicate, stale or orphaned).
    ImpactIgnored { object: ObjectHandle, tick: Tick },
}

/// Catalog mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    Registered { ability: AbilityId },
    Unregistered { ability: AbilityId },
    Reloaded {
        total: usize,
        defaulted: Vec<AbilityId>,
    },
    Cleared,
}
