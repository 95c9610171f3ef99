//! Composable cast-eligibility checks.
//!
//! Checks run before any side effect of a cast and must be side-effect free
//! and idempotent; callers may evaluate them speculatively.
//!
//! - [`NoneCheck`], [`LevelCheck`], [`ResourceCheck`], [`CooldownCheck`]:
//!   leaf checks
//! - [`CompositeCheck`]: ordered AND with short-circuit on the first failure
//! - [`from_config`]: builds a check tree from a declarative section keyed
//!   by `type`
mod checks;
mod composite;
mod loader;

pub use checks::{CooldownCheck, LevelCheck, NoneCheck, ResourceCheck};
pub use composite::CompositeCheck;
pub use loader::from_config;

use std::fmt;

use crate::cooldown::CooldownTracker;
use crate::env::ActorSource;
use crate::types::{ActorId, Tick};

/// Outcome of a prerequisite evaluation. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrerequisiteResult {
    ok: bool,
    reason: Option<String>,
}

impl PrerequisiteResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Human-readable rejection reason; `None` on success.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn into_reason(self) -> Option<String> {
        self.reason
    }
}

/// Read-only view a check evaluates against.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub actor: ActorId,
    pub now: Tick,
    pub actors: &'a dyn ActorSource,
    pub cooldowns: &'a CooldownTracker,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        actor: ActorId,
        now: Tick,
        actors: &'a dyn ActorSource,
        cooldowns: &'a CooldownTracker,
    ) -> Self {
        Self {
            actor,
            now,
            actors,
            cooldowns,
        }
    }
}

impl fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckContext")
            .field("actor", &self.actor)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// A single eligibility capability.
pub trait Prerequisite: Send + Sync + fmt::Debug {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult;

    /// Lowest actor level this check can pass for, if it gates on level.
    /// Used by catalog listings; never consulted during a cast.
    fn min_level(&self) -> Option<u32> {
        None
    }
}

impl<P: Prerequisite + ?Sized> Prerequisite for std::sync::Arc<P> {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult {
        (**self).check(ctx)
    }

    fn min_level(&self) -> Option<u32> {
        (**self).min_level()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use crate::error::DeductionError;
    use crate::types::{ResourceCost, ResourceKind};

    use super::*;

    /// Fixed actor table for check tests.
    #[derive(Default)]
    pub struct StaticActors {
        pub levels: HashMap<ActorId, u32>,
        pub resources: HashMap<(ActorId, ResourceKind), u32>,
    }

    impl StaticActors {
        pub fn with_level(mut self, actor: ActorId, level: u32) -> Self {
            self.levels.insert(actor, level);
            self
        }

        pub fn with_resource(mut self, actor: ActorId, kind: ResourceKind, amount: u32) -> Self {
            self.resources.insert((actor, kind), amount);
            self
        }
    }

    impl ActorSource for StaticActors {
        fn is_online(&self, actor: ActorId) -> bool {
            self.levels.contains_key(&actor)
        }

        fn level(&self, actor: ActorId) -> Option<u32> {
            self.levels.get(&actor).copied()
        }

        fn resource(&self, actor: ActorId, kind: ResourceKind) -> Option<u32> {
            self.resources.get(&(actor, kind)).copied()
        }

        fn try_deduct(&self, actor: ActorId, _costs: &[ResourceCost]) -> Result<(), DeductionError> {
            Err(DeductionError::UnknownActor(actor))
        }
    }
}
