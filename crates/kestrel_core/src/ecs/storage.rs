//! # Entity Storage
//!
//! Stable slot storage for the entities of one world.
//!
//! The storage uses a slot + free list strategy:
//! - An entity keeps its slot for its whole lifetime
//! - Freed slots are recycled, newest first
//! - Access is O(1) via [`EntityHandle`], checked against the slot's
//!   current occupant
//!
//! Systems receive `&mut EntityStorage` during their update and resolve
//! their membership handles through it.

use super::entity::{Entity, EntityHandle, EntityId, WorldId};
use super::registry::KindRegistry;

/// Slot storage owning every entity of a world.
pub struct EntityStorage {
    /// Tag of the owning world; handles from other worlds never resolve.
    world: WorldId,
    /// Entity slots. `None` = free.
    slots: Vec<Option<Entity>>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<usize>,
    /// Number of live entities.
    alive_count: usize,
}

impl EntityStorage {
    /// Creates storage for `world`, reserving room for `capacity` entities.
    pub(crate) fn with_capacity(world: WorldId, capacity: usize) -> Self {
        Self {
            world,
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    /// Tag of the owning world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> WorldId {
        self.world
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Returns `true` if no entity is alive.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Stores a new entity and returns its handle.
    pub(crate) fn insert(
        &mut self,
        id: EntityId,
        enabled: bool,
        registry: &KindRegistry,
    ) -> EntityHandle {
        let index = self.free_indices.pop().unwrap_or_else(|| {
            self.slots.push(None);
            self.slots.len() - 1
        });

        let handle = EntityHandle::new(self.world, index, id);
        self.slots[index] = Some(Entity::new(handle, enabled, registry.clone()));
        self.alive_count += 1;
        handle
    }

    /// Releases the entity behind `handle`, returning it.
    ///
    /// Returns `None` if the handle is stale or foreign.
    pub(crate) fn remove(&mut self, handle: EntityHandle) -> Option<Entity> {
        if !self.contains(handle) {
            return None;
        }

        let entity = self.slots[handle.index()].take();
        self.free_indices.push(handle.index());
        self.alive_count -= 1;
        entity
    }

    /// Drops every entity and forgets the free list.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_indices.clear();
        self.alive_count = 0;
    }

    /// Re-tags the storage; handles issued under the old tag stop resolving.
    pub(crate) fn rebind(&mut self, world: WorldId) {
        self.world = world;
    }

    /// Checks if a handle resolves to a live entity of this storage.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Gets an entity by handle.
    ///
    /// Returns `None` if the handle is stale (the entity was removed) or was
    /// issued by another world.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        if handle.world() != self.world {
            return None;
        }
        self.slots
            .get(handle.index())?
            .as_ref()
            .filter(|entity| entity.id() == handle.id())
    }

    /// Gets a mutable entity by handle.
    ///
    /// Returns `None` if the handle is stale or foreign.
    #[inline]
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        if handle.world() != self.world {
            return None;
        }
        self.slots
            .get_mut(handle.index())?
            .as_mut()
            .filter(|entity| entity.id() == handle.id())
    }

    /// Iterates over all live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    /// Iterates mutably over all live entities in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }
}

impl std::fmt::Debug for EntityStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStorage")
            .field("world", &self.world)
            .field("alive", &self.alive_count)
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (EntityStorage, KindRegistry) {
        (EntityStorage::with_capacity(WorldId::next(), 8), KindRegistry::new())
    }

    #[test]
    fn test_insert_remove() {
        let (mut storage, registry) = storage();

        let first = storage.insert(EntityId::new(0), true, &registry);
        let second = storage.insert(EntityId::new(1), false, &registry);
        assert_eq!(storage.len(), 2);
        assert!(storage.contains(first));
        assert!(storage.get(second).is_some_and(|e| !e.is_enabled()));

        assert!(storage.remove(first).is_some());
        assert!(!storage.contains(first));
        assert_eq!(storage.len(), 1);

        // Removing twice is a no-op
        assert!(storage.remove(first).is_none());
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_recycled_slot_rejects_stale_handle() {
        let (mut storage, registry) = storage();

        let old = storage.insert(EntityId::new(0), true, &registry);
        storage.remove(old);

        let new = storage.insert(EntityId::new(1), true, &registry);
        assert_eq!(new.index(), old.index()); // Same slot
        assert_ne!(new.id(), old.id()); // Different generation
        assert!(storage.get(old).is_none());
        assert!(storage.get(new).is_some());
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let (mut first, registry) = storage();
        let (mut second, _) = storage();

        let handle = first.insert(EntityId::new(0), true, &registry);
        second.insert(EntityId::new(0), true, &registry);

        assert!(second.get(handle).is_none());
        assert!(second.get_mut(handle).is_none());
    }

    #[test]
    fn test_rebind_invalidates_handles() {
        let (mut storage, registry) = storage();
        let handle = storage.insert(EntityId::new(0), true, &registry);

        storage.rebind(WorldId::next());
        assert!(!storage.contains(handle));
    }

    #[test]
    fn test_iter_skips_free_slots() {
        let (mut storage, registry) = storage();
        let a = storage.insert(EntityId::new(0), true, &registry);
        storage.insert(EntityId::new(1), true, &registry);
        storage.remove(a);

        let ids: Vec<u64> = storage.iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![1]);

        storage.clear();
        assert!(storage.is_empty());
        assert_eq!(storage.iter_mut().count(), 0);
    }
}
