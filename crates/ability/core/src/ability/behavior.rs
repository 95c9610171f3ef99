use crate::env::{ObjectHandle, TaskHandle};
use crate::error::ComputeError;

use super::{AbilityKind, CastContext, ImpactContext};

/// What a successful compute left behind.
#[derive(Debug)]
pub enum Computed {
    /// All effects were applied during compute.
    Applied,
    /// A tracked projectile will resolve the effect on impact.
    Deferred(ObjectHandle),
    /// A scheduled task keeps applying effects.
    Channeling(TaskHandle),
}

/// Single-entrypoint capability implemented by ability content.
///
/// The framework only calls through this trait; it never downcasts to a
/// concrete behavior.
pub trait AbilityBehavior: Send + Sync {
    fn kind(&self) -> AbilityKind;

    /// Runs once per successful cast, after cost has been deducted.
    fn compute(&self, ctx: &mut CastContext<'_>) -> Result<Computed, ComputeError>;

    /// Resolves a deferred impact. Called at most once per launched object.
    fn on_impact(&self, _ctx: &mut ImpactContext<'_>) -> Result<(), ComputeError> {
        Ok(())
    }
}
