use crate::error::DeductionError;
use crate::types::{ActorId, ResourceCost, ResourceKind};

/// Read access to actor progression plus atomic cost deduction.
///
/// Queries must be side-effect free; prerequisite checks call them
/// speculatively.
pub trait ActorSource: Send + Sync {
    /// Returns true while the actor is connected and can be attributed effects.
    fn is_online(&self, actor: ActorId) -> bool;

    /// Current level, or `None` for an unknown actor.
    fn level(&self, actor: ActorId) -> Option<u32>;

    /// Current amount held of `kind`, or `None` for an unknown actor.
    fn resource(&self, actor: ActorId, kind: ResourceKind) -> Option<u32>;

    /// Deducts every cost or none of them.
    ///
    /// Implementations re-validate holdings at the moment of deduction; a
    /// concurrent consumer may have spent the resource since the
    /// prerequisite check ran.
    fn try_deduct(&self, actor: ActorId, costs: &[ResourceCost]) -> Result<(), DeductionError>;
}
