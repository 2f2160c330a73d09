//! ID-keyed entity storage owned by each scene
//!
//! IDs are issued monotonically and never reused, so a stale ID held by a
//! spring or a UI selection can only miss, never alias a newer entity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to an entity in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity collection iterated in insertion (ID) order
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: BTreeMap<EntityId, T>,
    next_id: u64,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn insert(&mut self, item: T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, item);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.items.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.items.iter_mut().map(|(id, item)| (*id, item))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Remove every entity. The ID counter keeps running.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep only the entities for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId, &T) -> bool) {
        self.items.retain(|id, item| keep(*id, item));
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Arena<T> {
    /// Copy of every entity with its ID, in ID order
    pub fn snapshot(&self) -> Vec<(EntityId, T)> {
        self.iter().map(|(id, item)| (id, item.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        arena.remove(a);
        arena.clear();
        let c = arena.insert("c");
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert!(arena.get(b).is_none());
        assert_eq!(arena.get(c), Some(&"c"));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut arena = Arena::new();
        for v in [3, 1, 2] {
            arena.insert(v);
        }
        let values: Vec<_> = arena.values().copied().collect();
        assert_eq!(values, vec![3, 1, 2]);
    }
}
