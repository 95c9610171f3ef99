//! Per-(actor, ability) rate limiting on the tick clock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::ability::AbilityId;
use crate::types::{ActorId, Tick};

/// Expiry of one actor's cooldown on one ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownRecord {
    pub actor: ActorId,
    pub ability: AbilityId,
    pub expire_at: Tick,
}

/// Expiring map of cooldown records, one per (actor, ability) pair.
///
/// Every operation is a single upsert, lookup or removal; last writer wins.
/// Readers on other threads (monitoring, tooling) may query concurrently
/// with main-line stamping.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    records: RwLock<HashMap<(ActorId, AbilityId), Tick>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets expiry to `now + duration_ticks`, replacing any previous record.
    pub fn stamp(&self, actor: ActorId, ability: &AbilityId, now: Tick, duration_ticks: u64) {
        let expire_at = now + duration_ticks;
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((actor, ability.clone()), expire_at);
    }

    /// Ticks left before the pair may cast again; zero when no record exists.
    pub fn remaining(&self, actor: ActorId, ability: &AbilityId, now: Tick) -> u64 {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(actor, ability.clone()))
            .map_or(0, |expire_at| expire_at.since(now))
    }

    pub fn remaining_millis(&self, actor: ActorId, ability: &AbilityId, now: Tick) -> u64 {
        Tick::millis_of(self.remaining(actor, ability, now))
    }

    pub fn is_on_cooldown(&self, actor: ActorId, ability: &AbilityId, now: Tick) -> bool {
        self.remaining(actor, ability, now) > 0
    }

    pub fn clear(&self, actor: ActorId, ability: &AbilityId) -> bool {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(actor, ability.clone()))
            .is_some()
    }

    /// Drops every record of `actor`. Returns the number removed.
    pub fn clear_all(&self, actor: ActorId) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|(owner, _), _| *owner != actor);
        before - records.len()
    }

    /// Drops every record.
    pub fn reset(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drops records that have expired at `now`. Returns the number removed.
    pub fn sweep_expired(&self, now: Tick) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|_, expire_at| *expire_at > now);
        before - records.len()
    }

    /// Active records of `actor`, soonest expiry first.
    pub fn records_for(&self, actor: ActorId) -> Vec<CooldownRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<CooldownRecord> = records
            .iter()
            .filter(|((owner, _), _)| *owner == actor)
            .map(|((owner, ability), expire_at)| CooldownRecord {
                actor: *owner,
                ability: ability.clone(),
                expire_at: *expire_at,
            })
            .collect();
        out.sort_by(|a, b| a.expire_at.cmp(&b.expire_at).then_with(|| a.ability.cmp(&b.ability)));
        out
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: ActorId = ActorId(1);
    const BOB: ActorId = ActorId(2);

    fn fireball() -> AbilityId {
        AbilityId::new("fireball")
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let tracker = CooldownTracker::new();
        tracker.stamp(ALICE, &fireball(), Tick(100), 100);

        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(100)), 100);
        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(150)), 50);
        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(200)), 0);
        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(500)), 0);
        assert_eq!(tracker.remaining_millis(ALICE, &fireball(), Tick(150)), 2500);
    }

    #[test]
    fn missing_record_means_ready() {
        let tracker = CooldownTracker::new();
        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(0)), 0);
        assert!(!tracker.is_on_cooldown(ALICE, &fireball(), Tick(0)));
    }

    #[test]
    fn stamp_then_clear_at_the_same_tick() {
        let tracker = CooldownTracker::new();
        let now = Tick(42);

        tracker.stamp(ALICE, &fireball(), now, 1);
        assert!(tracker.remaining(ALICE, &fireball(), now) > 0);

        assert!(tracker.clear(ALICE, &fireball()));
        assert_eq!(tracker.remaining(ALICE, &fireball(), now), 0);
    }

    #[test]
    fn restamping_overwrites_instead_of_accumulating() {
        let tracker = CooldownTracker::new();
        tracker.stamp(ALICE, &fireball(), Tick(0), 100);
        tracker.stamp(ALICE, &fireball(), Tick(10), 5);

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.remaining(ALICE, &fireball(), Tick(10)), 5);
    }

    #[test]
    fn clear_all_only_touches_one_actor() {
        let tracker = CooldownTracker::new();
        let spark = AbilityId::new("spark");
        tracker.stamp(ALICE, &fireball(), Tick(0), 100);
        tracker.stamp(ALICE, &spark, Tick(0), 100);
        tracker.stamp(BOB, &fireball(), Tick(0), 100);

        assert_eq!(tracker.clear_all(ALICE), 2);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_on_cooldown(BOB, &fireball(), Tick(1)));
    }

    #[test]
    fn sweep_drops_only_expired_records() {
        let tracker = CooldownTracker::new();
        tracker.stamp(ALICE, &fireball(), Tick(0), 10);
        tracker.stamp(BOB, &fireball(), Tick(0), 100);

        assert_eq!(tracker.sweep_expired(Tick(10)), 1);
        assert_eq!(tracker.records_for(BOB).len(), 1);
        assert!(tracker.records_for(ALICE).is_empty());
    }
}
