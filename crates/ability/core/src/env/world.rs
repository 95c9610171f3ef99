use std::fmt;

use crate::types::{ActorId, Vec3};

/// Generational reference to a framework-tracked world object.
///
/// The index addresses an arena slot; the generation changes each time the
/// slot is recycled, so a stale handle never resolves to a newer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectHandle {
    pub index: u32,
    pub generation: u32,
}

impl ObjectHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj{}v{}", self.index, self.generation)
    }
}

/// A living entity reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LivingEntity {
    pub id: ActorId,
    pub position: Vec3,
}

/// World operations the framework needs from the host.
///
/// Physics stays with the host: the framework spawns objects with an
/// initial velocity, steers them, and is told about collisions through the
/// deferred-effect service.
pub trait WorldHost: Send + Sync {
    /// Spawns a host object for `handle`. Returns false if the host refused.
    fn spawn_projectile(&self, handle: ObjectHandle, origin: Vec3, velocity: Vec3) -> bool;

    /// Current position, or `None` once the object is gone.
    fn object_position(&self, handle: ObjectHandle) -> Option<Vec3>;

    /// Current velocity, or `None` once the object is gone.
    fn object_velocity(&self, handle: ObjectHandle) -> Option<Vec3>;

    fn set_velocity(&self, handle: ObjectHandle, velocity: Vec3);

    /// Removes the host object. Removing an unknown handle is a no-op.
    fn remove_object(&self, handle: ObjectHandle);

    /// Position of a living entity, or `None` if it is gone or dead.
    fn entity_position(&self, entity: ActorId) -> Option<Vec3>;

    /// Living entities within `radius` of `center`.
    fn living_entities_near(&self, center: Vec3, radius: f64) -> Vec<LivingEntity>;
}
