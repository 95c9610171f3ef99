//! Ability templates, immutable definitions and the compute capability.
//!
//! Content implements [`AbilityBehavior`]; the framework materializes an
//! [`AbilityInstance`] from an [`AbilityBuilder`] and only ever calls the
//! behavior through its single entrypoint (plus the optional impact hook for
//! deferred effects).
mod behavior;
mod builder;
mod context;
mod definition;
mod id;

pub use behavior::{AbilityBehavior, Computed};
pub use builder::{AbilityBuilder, AbilityInstance};
pub use context::{CastContext, ImpactContext, ResolvedTarget, TargetContext};
pub use definition::{AbilityDefinition, AbilityFlags, AbilityKind, fold_case};
pub use id::AbilityId;
