use crate::types::{ActorId, Vec3};

/// Opaque output primitives exposed to ability authors.
///
/// Calls are fire-and-forget: the framework neither retries nor inspects
/// them beyond discarding obviously empty arguments.
pub trait EffectSink: Send + Sync {
    fn spawn_particles(&self, at: Vec3, particle: &str, count: u32);

    fn play_sound(&self, at: Vec3, sound: &str, volume: f32, pitch: f32);

    /// Applies damage to `target`, attributed to `source` when known.
    fn apply_damage(&self, target: ActorId, amount: f64, source: Option<ActorId>);

    fn apply_healing(&self, target: ActorId, amount: f64);

    fn send_message(&self, actor: ActorId, message: &str);
}
