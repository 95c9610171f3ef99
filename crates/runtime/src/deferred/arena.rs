//! Generational arena for tracked world objects.

use ability_core::ObjectHandle;
use thiserror::Error;

/// Every addressable slot is occupied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("arena is full ({capacity} slots)")]
pub struct ArenaFull {
    pub capacity: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage addressed by [`ObjectHandle`].
///
/// Removing an entry bumps its slot generation, so a handle that outlived
/// its object never resolves to whatever later reuses the slot. Slot
/// indices are bounded by `capacity`, which never exceeds `u32::MAX`.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    capacity: u32,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::bounded(u32::MAX)
    }

    /// Arena holding at most `capacity` live entries.
    pub fn bounded(capacity: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            capacity,
        }
    }

    /// Stores `value` in a recycled slot, or a fresh one while under
    /// capacity. A full arena hands the value back untouched.
    pub fn insert(&mut self, value: T) -> Result<ObjectHandle, (ArenaFull, T)> {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.value = Some(value);
                self.len += 1;
                return Ok(ObjectHandle::new(index, slot.generation));
            }
        }
        let index = match u32::try_from(self.slots.len()) {
            Ok(index) if index < self.capacity => index,
            _ => {
                let full = ArenaFull {
                    capacity: self.capacity,
                };
                return Err((full, value));
            }
        };
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.len += 1;
        Ok(ObjectHandle::new(index, 0))
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn remove(&mut self, handle: ObjectHandle) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Removes every entry, returning them with their handles.
    pub fn drain(&mut self) -> Vec<(ObjectHandle, T)> {
        let mut drained = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                let index = index as u32;
                drained.push((ObjectHandle::new(index, slot.generation), value));
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
        self.len = 0;
        drained
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (ObjectHandle::new(index as u32, slot.generation), value))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert<T>(arena: &mut Arena<T>, value: T) -> ObjectHandle {
        match arena.insert(value) {
            Ok(handle) => handle,
            Err((full, _)) => panic!("unexpected {full}"),
        }
    }

    #[test]
    fn stale_handles_miss_recycled_slots() {
        let mut arena = Arena::new();
        let first = insert(&mut arena, "first");
        assert_eq!(arena.remove(first), Some("first"));

        let second = insert(&mut arena, "second");
        assert_eq!(second.index, first.index);
        assert_ne!(second.generation, first.generation);
        assert!(arena.get(first).is_none());
        assert!(arena.remove(first).is_none());
        assert_eq!(arena.get(second), Some(&"second"));
    }

    #[test]
    fn drain_empties_and_invalidates() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1);
        let b = insert(&mut arena, 2);

        let drained = arena.drain();
        assert_eq!(drained.len(), 2);
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert!(!arena.contains(b));
        assert_eq!(arena.iter().count(), 0);
    }

    #[test]
    fn full_arena_returns_the_value_instead_of_aliasing() {
        let mut arena = Arena::bounded(2);
        let a = insert(&mut arena, "a");
        let b = insert(&mut arena, "b");

        let Err((full, rejected)) = arena.insert("c") else {
            panic!("third insert should not fit");
        };
        assert_eq!(full, ArenaFull { capacity: 2 });
        assert_eq!(rejected, "c");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));

        arena.remove(a);
        let c = insert(&mut arena, "c");
        assert_eq!(c.index, a.index);
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 2);
    }
}
