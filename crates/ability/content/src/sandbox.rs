//! In-memory host for tests, demos and the simulator.
//!
//! [`SandboxHost`] implements [`ActorSource`], [`WorldHost`] and
//! [`EffectSink`] over a single mutex-guarded state:
//! - entities with a level, resource pools, a position and health
//! - world objects moving by their velocity on [`SandboxHost::step`]
//! - an append-only log of every effect the framework emitted

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ability_core::{
    ActorId, ActorSource, DeductionError, EffectSink, LivingEntity, ObjectHandle, ResourceCost,
    ResourceKind, Vec3, WorldHost,
};

/// Distance at which a moving object collides with a living entity.
pub const HIT_RADIUS: f64 = 0.75;

/// One effect emitted through [`EffectSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum EffectRecord {
    Particles {
        at: Vec3,
        particle: String,
        count: u32,
    },
    Sound {
        at: Vec3,
        sound: String,
        volume: f32,
        pitch: f32,
    },
    Damage {
        target: ActorId,
        amount: f64,
        source: Option<ActorId>,
    },
    Healing {
        target: ActorId,
        amount: f64,
    },
    Message {
        actor: ActorId,
        text: String,
    },
}

/// Object that touched a living entity during [`SandboxHost::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub handle: ObjectHandle,
    pub position: Vec3,
    pub entity: ActorId,
}

#[derive(Clone, Debug)]
struct SandboxEntity {
    /// Players are actors; creatures only exist in the world.
    player: bool,
    level: u32,
    resources: HashMap<ResourceKind, u32>,
    position: Vec3,
    health: f64,
    max_health: f64,
}

#[derive(Clone, Copy, Debug)]
struct SandboxObject {
    position: Vec3,
    velocity: Vec3,
}

#[derive(Debug, Default)]
struct SandboxState {
    entities: BTreeMap<ActorId, SandboxEntity>,
    objects: BTreeMap<ObjectHandle, SandboxObject>,
    effects: Vec<EffectRecord>,
    reject_spawns: bool,
}

/// Deterministic in-memory host.
#[derive(Debug, Default)]
pub struct SandboxHost {
    state: Mutex<SandboxState>,
}

impl SandboxHost {
    pub const PLAYER_HEALTH: f64 = 20.0;
    pub const STARTING_MANA: u32 = 100;
    pub const STARTING_STAMINA: u32 = 100;

    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SandboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== population =====

    /// Adds an online player with full health and starting pools.
    pub fn add_player(&self, id: ActorId, level: u32, position: Vec3) {
        let resources = HashMap::from([
            (ResourceKind::Mana, Self::STARTING_MANA),
            (ResourceKind::Stamina, Self::STARTING_STAMINA),
        ]);
        self.state().entities.insert(
            id,
            SandboxEntity {
                player: true,
                level,
                resources,
                position,
                health: Self::PLAYER_HEALTH,
                max_health: Self::PLAYER_HEALTH,
            },
        );
    }

    /// Adds a living non-player entity.
    pub fn add_creature(&self, id: ActorId, position: Vec3, health: f64) {
        self.state().entities.insert(
            id,
            SandboxEntity {
                player: false,
                level: 0,
                resources: HashMap::new(),
                position,
                health,
                max_health: health,
            },
        );
    }

    /// Removes an entity from the world; casts and impacts then see it offline.
    pub fn disconnect(&self, id: ActorId) -> bool {
        self.state().entities.remove(&id).is_some()
    }

    pub fn set_level(&self, id: ActorId, level: u32) {
        if let Some(entity) = self.state().entities.get_mut(&id) {
            entity.level = level;
        }
    }

    pub fn set_resource(&self, id: ActorId, kind: ResourceKind, amount: u32) {
        let mut state = self.state();
        let Some(entity) = state.entities.get_mut(&id) else {
            return;
        };
        match kind {
            ResourceKind::Health => entity.health = f64::from(amount),
            _ => {
                entity.resources.insert(kind, amount);
            }
        }
    }

    pub fn set_position(&self, id: ActorId, position: Vec3) {
        if let Some(entity) = self.state().entities.get_mut(&id) {
            entity.position = position;
        }
    }

    /// Makes every following `spawn_projectile` call fail.
    pub fn reject_spawns(&self, reject: bool) {
        self.state().reject_spawns = reject;
    }

    // ===== inspection =====

    pub fn health(&self, id: ActorId) -> Option<f64> {
        self.state().entities.get(&id).map(|entity| entity.health)
    }

    pub fn effects(&self) -> Vec<EffectRecord> {
        self.state().effects.clone()
    }

    /// Drains the effect log.
    pub fn take_effects(&self) -> Vec<EffectRecord> {
        std::mem::take(&mut self.state().effects)
    }

    /// Number of damage effects applied to `target`.
    pub fn damage_events(&self, target: ActorId) -> usize {
        self.state()
            .effects
            .iter()
            .filter(|effect| matches!(effect, EffectRecord::Damage { target: t, .. } if *t == target))
            .count()
    }

    /// Messages delivered to `actor`, oldest first.
    pub fn messages_for(&self, actor: ActorId) -> Vec<String> {
        self.state()
            .effects
            .iter()
            .filter_map(|effect| match effect {
                EffectRecord::Message { actor: a, text } if *a == actor => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    pub fn objects(&self) -> Vec<ObjectHandle> {
        self.state().objects.keys().copied().collect()
    }

    // ===== physics =====

    /// Advances every object by its velocity and reports objects that now
    /// overlap a living entity. Objects stay in the world until removed.
    pub fn step(&self) -> Vec<Collision> {
        let mut state = self.state();
        let SandboxState {
            entities, objects, ..
        } = &mut *state;

        let mut collisions = Vec::new();
        for (handle, object) in objects.iter_mut() {
            object.position = object.position + object.velocity;
            let hit = entities
                .iter()
                .filter(|(_, entity)| entity.health > 0.0)
                .find(|(_, entity)| entity.position.distance(object.position) <= HIT_RADIUS);
            if let Some((id, _)) = hit {
                collisions.push(Collision {
                    handle: *handle,
                    position: object.position,
                    entity: *id,
                });
            }
        }
        collisions
    }
}

// ============================================================================
// Host traits
// ============================================================================

impl ActorSource for SandboxHost {
    fn is_online(&self, actor: ActorId) -> bool {
        self.state()
            .entities
            .get(&actor)
            .is_some_and(|entity| entity.player)
    }

    fn level(&self, actor: ActorId) -> Option<u32> {
        self.state()
            .entities
            .get(&actor)
            .filter(|entity| entity.player)
            .map(|entity| entity.level)
    }

    fn resource(&self, actor: ActorId, kind: ResourceKind) -> Option<u32> {
        let state = self.state();
        let entity = state.entities.get(&actor).filter(|entity| entity.player)?;
        match kind {
            ResourceKind::Health => Some(entity.health.max(0.0).floor() as u32),
            _ => Some(entity.resources.get(&kind).copied().unwrap_or(0)),
        }
    }

    fn try_deduct(&self, actor: ActorId, costs: &[ResourceCost]) -> Result<(), DeductionError> {
        let mut state = self.state();
        let entity = state
            .entities
            .get_mut(&actor)
            .filter(|entity| entity.player)
            .ok_or(DeductionError::UnknownActor(actor))?;

        // Validate every pool before touching any of them.
        for cost in costs {
            let available = match cost.kind {
                ResourceKind::Health => entity.health.max(0.0).floor() as u32,
                kind => entity.resources.get(&kind).copied().unwrap_or(0),
            };
            if available < cost.amount {
                return Err(DeductionError::Insufficient {
                    kind: cost.kind,
                    required: cost.amount,
                    available,
                });
            }
        }
        for cost in costs {
            match cost.kind {
                ResourceKind::Health => entity.health -= f64::from(cost.amount),
                kind => {
                    let pool = entity.resources.entry(kind).or_insert(0);
                    *pool -= cost.amount;
                }
            }
        }
        Ok(())
    }
}

impl WorldHost for SandboxHost {
    fn spawn_projectile(&self, handle: ObjectHandle, origin: Vec3, velocity: Vec3) -> bool {
        let mut state = self.state();
        if state.reject_spawns || state.objects.contains_key(&handle) {
            return false;
        }
        state.objects.insert(
            handle,
            SandboxObject {
                position: origin,
                velocity,
            },
        );
        true
    }

    fn object_position(&self, handle: ObjectHandle) -> Option<Vec3> {
        self.state().objects.get(&handle).map(|object| object.position)
    }

    fn object_velocity(&self, handle: ObjectHandle) -> Option<Vec3> {
        self.state().objects.get(&handle).map(|object| object.velocity)
    }

    fn set_velocity(&self, handle: ObjectHandle, velocity: Vec3) {
        if let Some(object) = self.state().objects.get_mut(&handle) {
            object.velocity = velocity;
        }
    }

    fn remove_object(&self, handle: ObjectHandle) {
        self.state().objects.remove(&handle);
    }

    fn entity_position(&self, entity: ActorId) -> Option<Vec3> {
        self.state()
            .entities
            .get(&entity)
            .filter(|entity| entity.health > 0.0)
            .map(|entity| entity.position)
    }

    fn living_entities_near(&self, center: Vec3, radius: f64) -> Vec<LivingEntity> {
        self.state()
            .entities
            .iter()
            .filter(|(_, entity)| entity.health > 0.0)
            .filter(|(_, entity)| entity.position.distance(center) <= radius)
            .map(|(id, entity)| LivingEntity {
                id: *id,
                position: entity.position,
            })
            .collect()
    }
}

impl EffectSink for SandboxHost {
    fn spawn_particles(&self, at: Vec3, particle: &str, count: u32) {
        self.state().effects.push(EffectRecord::Particles {
            at,
            particle: particle.to_owned(),
            count,
        });
    }

    fn play_sound(&self, at: Vec3, sound: &str, volume: f32, pitch: f32) {
        self.state().effects.push(EffectRecord::Sound {
            at,
            sound: sound.to_owned(),
            volume,
            pitch,
        });
    }

    fn apply_damage(&self, target: ActorId, amount: f64, source: Option<ActorId>) {
        let mut state = self.state();
        if let Some(entity) = state.entities.get_mut(&target) {
            entity.health = (entity.health - amount).max(0.0);
        }
        state.effects.push(EffectRecord::Damage {
            target,
            amount,
            source,
        });
    }

    fn apply_healing(&self, target: ActorId, amount: f64) {
        let mut state = self.state();
        if let Some(entity) = state.entities.get_mut(&target) {
            entity.health = (entity.health + amount).min(entity.max_health);
        }
        state.effects.push(EffectRecord::Healing { target, amount });
    }

    fn send_message(&self, actor: ActorId, message: &str) {
        self.state().effects.push(EffectRecord::Message {
            actor,
            text: message.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: ActorId = ActorId(1);
    const WOLF: ActorId = ActorId(100);

    #[test]
    fn deduction_is_all_or_nothing() {
        let host = SandboxHost::new();
        host.add_player(ALICE, 1, Vec3::ZERO);
        host.set_resource(ALICE, ResourceKind::Mana, 30);

        let costs = [
            ResourceCost::new(ResourceKind::Mana, 20),
            ResourceCost::new(ResourceKind::Stamina, 500),
        ];
        assert!(matches!(
            host.try_deduct(ALICE, &costs),
            Err(DeductionError::Insufficient {
                kind: ResourceKind::Stamina,
                ..
            })
        ));
        assert_eq!(host.resource(ALICE, ResourceKind::Mana), Some(30));

        assert!(host.try_deduct(ALICE, &costs[..1]).is_ok());
        assert_eq!(host.resource(ALICE, ResourceKind::Mana), Some(10));
    }

    #[test]
    fn creatures_are_not_actors() {
        let host = SandboxHost::new();
        host.add_creature(WOLF, Vec3::ZERO, 8.0);

        assert!(!host.is_online(WOLF));
        assert_eq!(host.level(WOLF), None);
        assert_eq!(host.living_entities_near(Vec3::ZERO, 1.0).len(), 1);
    }

    #[test]
    fn step_reports_collisions_with_living_entities() {
        let host = SandboxHost::new();
        host.add_creature(WOLF, Vec3::new(3.0, 0.0, 0.0), 8.0);
        let handle = ObjectHandle::new(0, 0);
        assert!(host.spawn_projectile(handle, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        assert!(!host.spawn_projectile(handle, Vec3::ZERO, Vec3::ZERO));

        assert!(host.step().is_empty());
        assert!(host.step().is_empty());
        let hits = host.step();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, WOLF);
    }

    #[test]
    fn damage_and_healing_are_recorded_and_clamped() {
        let host = SandboxHost::new();
        host.add_player(ALICE, 1, Vec3::ZERO);

        host.apply_damage(ALICE, 5.0, Some(WOLF));
        host.apply_healing(ALICE, 50.0);

        assert_eq!(host.health(ALICE), Some(SandboxHost::PLAYER_HEALTH));
        assert_eq!(host.damage_events(ALICE), 1);
        assert_eq!(host.take_effects().len(), 2);
        assert!(host.effects().is_empty());
    }
}
