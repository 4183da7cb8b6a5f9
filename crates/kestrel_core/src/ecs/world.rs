//! # ECS World
//!
//! Owns a set of entities and a slot-indexed set of systems, and keeps the
//! two matched.
//!
//! ## Refresh
//!
//! ```text
//! order:  [ E0 on | E3 off | E1 on | E2 off | E4 on ]
//!            low ->                       <- high
//! swap:   [ E0 on | E4 on  | E1 on | E2 off | E3 off ]
//!                            ^ active_count = 3
//! ```
//!
//! 1. Partition the entity order in place: enabled entities first.
//! 2. For each active entity and each active system: link on intersection,
//!    unlink on no intersection.
//!
//! Entities outside the active region are not evaluated. A link made while
//! an entity was active survives its disabling until it is re-evaluated or
//! removed.

use std::any::type_name;

use tracing::{debug, warn};

use super::capability::CapabilitySet;
use super::component::{Component, ComponentBundle};
use super::entity::{Entity, EntityHandle, EntityId, WorldId};
use super::registry::KindRegistry;
use super::storage::EntityStorage;
use super::system::{AnySystem, System};
use crate::app::FrameTime;
use crate::error::{EcsError, EcsResult};

/// The ECS World - entities, systems, and the membership between them.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Component, KindRegistry, Membership, System, World};
///
/// struct Tag;
/// impl Component for Tag {}
///
/// #[derive(Default)]
/// struct Tagged {
///     membership: Membership,
/// }
///
/// impl System for Tagged {
///     fn membership(&self) -> &Membership { &self.membership }
///     fn membership_mut(&mut self) -> &mut Membership { &mut self.membership }
/// }
///
/// let mut world = World::new(KindRegistry::new());
/// world.add_system_with(|registry| Tagged {
///     membership: Membership::new().with_component::<Tag>(registry),
/// });
///
/// let entity = world.add_entity(true);
/// entity.add_component(Tag);
/// let handle = entity.handle();
///
/// world.refresh();
/// assert!(world.get_system::<Tagged>().unwrap().contains_entity(handle));
/// ```
pub struct World {
    /// Tag stamped on every handle this world issues.
    id: WorldId,
    /// Identities of component and system kinds.
    registry: KindRegistry,
    /// Entity slots.
    entities: EntityStorage,
    /// Entity sequence that refresh partitions; enabled entities first.
    order: Vec<EntityHandle>,
    /// Length of the enabled prefix of `order` after the last refresh.
    active_entity_count: usize,
    /// Next entity id. Only increases until `destroy`.
    next_entity_id: u64,
    /// Systems indexed by system kind identity.
    systems: Vec<Option<Box<dyn AnySystem>>>,
    /// Bit *i* set = system slot *i* is present and still active.
    active_systems: CapabilitySet,
}

impl World {
    /// Creates an empty world using `registry` for kind identities.
    #[must_use]
    pub fn new(registry: KindRegistry) -> Self {
        Self::with_capacity(registry, 0)
    }

    /// Creates an empty world, reserving room for `entity_capacity` entities.
    #[must_use]
    pub fn with_capacity(registry: KindRegistry, entity_capacity: usize) -> Self {
        let id = WorldId::next();
        Self {
            id,
            registry,
            entities: EntityStorage::with_capacity(id, entity_capacity),
            order: Vec::with_capacity(entity_capacity),
            active_entity_count: 0,
            next_entity_id: 0,
            systems: Vec::new(),
            active_systems: CapabilitySet::new(),
        }
    }

    /// The tag carried by handles issued by this world.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// The registry used for kind identities.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with the next sequential id.
    pub fn add_entity(&mut self, enabled: bool) -> &mut Entity {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;

        let handle = self.entities.insert(id, enabled, &self.registry);
        self.order.push(handle);
        if enabled {
            self.active_entity_count += 1;
        }

        match self.entities.get_mut(handle) {
            Some(entity) => entity,
            None => unreachable!("{id} was just inserted"),
        }
    }

    /// Creates an enabled entity holding `component`.
    pub fn add_entity_with_component<K: Component>(&mut self, component: K) -> &mut Entity {
        let entity = self.add_entity(true);
        entity.add_component(component);
        entity
    }

    /// Creates an entity holding every component in `bundle`.
    pub fn add_entity_with_components<B: ComponentBundle>(
        &mut self,
        enabled: bool,
        bundle: B,
    ) -> &mut Entity {
        let entity = self.add_entity(enabled);
        entity.add_components(bundle);
        entity
    }

    /// Removes an entity.
    ///
    /// Every system unlinks the entity before its storage is released.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotOwned`] if `entity` does not resolve in this
    /// world (foreign, stale, or already removed). The world is unchanged.
    pub fn remove_entity(&mut self, entity: EntityHandle) -> EcsResult<()> {
        if self.entities.get(entity).is_none() {
            return Err(EcsError::EntityNotOwned {
                entity: entity.id(),
                world: self.id,
            });
        };

        for system in self.systems.iter_mut().flatten() {
            system.unlink_entity(entity);
        }

        // The active prefix shrinks only if the entity sat inside it
        if let Some(position) = self.order.iter().position(|&handle| handle == entity) {
            self.order.remove(position);
            if position < self.active_entity_count {
                self.active_entity_count -= 1;
            }
        }

        self.entities.remove(entity);
        Ok(())
    }

    /// Gets an entity by handle.
    #[inline]
    #[must_use]
    pub fn entity(&self, entity: EntityHandle) -> Option<&Entity> {
        self.entities.get(entity)
    }

    /// Gets a mutable entity by handle.
    #[inline]
    pub fn entity_mut(&mut self, entity: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(entity)
    }

    /// The entity storage.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// The entity sequence; after a refresh, enabled entities come first.
    #[inline]
    #[must_use]
    pub fn entity_order(&self) -> &[EntityHandle] {
        &self.order
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Length of the enabled prefix of [`World::entity_order`].
    #[inline]
    #[must_use]
    pub const fn active_entity_count(&self) -> usize {
        self.active_entity_count
    }

    /// Handles of the entities holding every kind in `required`.
    #[must_use]
    pub fn entities_with(&self, required: &CapabilitySet) -> Vec<EntityHandle> {
        self.order
            .iter()
            .copied()
            .filter(|&handle| {
                self.entities
                    .get(handle)
                    .is_some_and(|entity| entity.components().contains_all(required))
            })
            .collect()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Adds a system and marks it active.
    ///
    /// An existing system of the same kind is destroyed and replaced.
    pub fn add_system<S: System>(&mut self, system: S) -> &mut S {
        let slot = self.registry.register_system::<S>().index();
        if slot >= self.systems.len() {
            self.systems.resize_with(slot + 1, || None);
        }

        if let Some(mut previous) = self.systems[slot].take() {
            warn!(world = self.id.get(), system = type_name::<S>(), "replacing system");
            previous.destroy();
        }

        self.systems[slot] = Some(Box::new(system));
        self.active_systems.set(slot, true);

        match self.systems[slot]
            .as_deref_mut()
            .and_then(|system| system.as_any_mut().downcast_mut::<S>())
        {
            Some(system) => system,
            None => unreachable!("system slot {slot} was just filled"),
        }
    }

    /// Builds a system from the world's registry and adds it.
    pub fn add_system_with<S, F>(&mut self, build: F) -> &mut S
    where
        S: System,
        F: FnOnce(&KindRegistry) -> S,
    {
        let system = build(&self.registry);
        self.add_system(system)
    }

    /// Returns `true` if a system of kind `S` is present (active or not).
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.slot_of::<S>().is_some()
    }

    /// Returns `true` if a system of kind `S` is present and still active.
    #[must_use]
    pub fn is_system_active<S: System>(&self) -> bool {
        self.slot_of::<S>()
            .is_some_and(|slot| self.active_systems.get(slot))
    }

    /// Gets the system of kind `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if no such system was added.
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        self.slot_of::<S>()
            .and_then(|slot| self.systems[slot].as_deref())
            .and_then(|system| system.as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotFound {
                system: type_name::<S>(),
            })
    }

    /// Gets the system of kind `S`, mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if no such system was added.
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        let missing = EcsError::SystemNotFound {
            system: type_name::<S>(),
        };
        match self.slot_of::<S>() {
            Some(slot) => self.systems[slot]
                .as_deref_mut()
                .and_then(|system| system.as_any_mut().downcast_mut::<S>())
                .ok_or(missing),
            None => Err(missing),
        }
    }

    /// Removes the system of kind `S`, calling its `destroy` hook.
    ///
    /// The kind's identity is kept; adding `S` again reuses the slot.
    pub fn remove_system<S: System>(&mut self) {
        let Some(slot) = self.slot_of::<S>() else {
            return;
        };
        if let Some(mut system) = self.systems[slot].take() {
            system.destroy();
        }
        self.active_systems.set(slot, false);
    }

    /// Number of present systems (active or not).
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.iter().flatten().count()
    }

    /// Slot of `S` if a system of that kind is present.
    fn slot_of<S: System>(&self) -> Option<usize> {
        self.registry
            .system_id::<S>()
            .map(|id| id.index())
            .filter(|&slot| self.systems.get(slot).is_some_and(Option::is_some))
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Refreshes memberships, then runs every active system in slot order.
    ///
    /// A system returning `false` is deactivated for good.
    ///
    /// # Returns
    ///
    /// `true` while at least one system remains active.
    pub fn update(&mut self, frame: &FrameTime) -> bool {
        self.refresh();

        let Self {
            id,
            entities,
            systems,
            active_systems,
            ..
        } = self;

        for (slot, system) in systems.iter_mut().enumerate() {
            let Some(system) = system else {
                continue;
            };
            if !active_systems.get(slot) {
                continue;
            }
            if !system.update(frame, entities) {
                active_systems.set(slot, false);
                debug!(world = id.get(), slot, "system deactivated");
            }
        }

        active_systems.any()
    }

    /// Re-partitions the entities and re-matches active entities against
    /// active systems.
    pub fn refresh(&mut self) {
        if self.order.is_empty() {
            return;
        }

        self.partition_entities();

        let Self {
            entities,
            order,
            active_entity_count,
            systems,
            active_systems,
            ..
        } = self;

        for &handle in &order[..*active_entity_count] {
            let Some(entity) = entities.get(handle) else {
                continue;
            };
            if !entity.is_enabled() {
                continue;
            }

            for (slot, system) in systems.iter_mut().enumerate() {
                let Some(system) = system else {
                    continue;
                };
                if !active_systems.get(slot) {
                    continue;
                }

                let matches = system.required_components().intersects(entity.components());
                let linked = system.contains_entity(handle);
                if matches && !linked {
                    system.link_entity(handle);
                } else if linked && !matches {
                    system.unlink_entity(handle);
                }
            }
        }
    }

    /// Two-cursor in-place partition: enabled entities to the front.
    fn partition_entities(&mut self) {
        let Self {
            entities,
            order,
            active_entity_count,
            ..
        } = self;
        let enabled = |handle: EntityHandle| entities.get(handle).is_some_and(Entity::is_enabled);

        let mut low = 0;
        let mut high = order.len();
        loop {
            while low < high && enabled(order[low]) {
                low += 1;
            }
            while low < high && !enabled(order[high - 1]) {
                high -= 1;
            }
            if low >= high {
                break;
            }
            order.swap(low, high - 1);
            low += 1;
            high -= 1;
        }

        *active_entity_count = low;
    }

    /// Tears the world down.
    ///
    /// Drops every entity and resets both entity counters, empties every
    /// system's membership and calls its `destroy` hook, then drops the
    /// systems. The world gets a new [`WorldId`], so handles issued before
    /// the teardown never resolve again.
    pub fn destroy(&mut self) {
        self.order.clear();
        self.entities.clear();
        self.active_entity_count = 0;
        self.next_entity_id = 0;

        for system in self.systems.iter_mut().flatten() {
            system.membership_mut().clear();
            system.destroy();
        }
        self.systems.clear();
        self.active_systems.clear();

        self.id = WorldId::next();
        self.entities.rebind(self.id);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("entities", &self.entities.len())
            .field("active_entities", &self.active_entity_count)
            .field("systems", &self.system_count())
            .field("active_systems", &self.active_systems)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::Membership;

    struct Position;
    impl Component for Position {}

    struct Velocity;
    impl Component for Velocity {}

    #[derive(Default)]
    struct Movement {
        membership: Membership,
        destroyed: bool,
    }

    impl Movement {
        fn new(registry: &KindRegistry) -> Self {
            Self {
                membership: Membership::new().with_component::<Velocity>(registry),
                destroyed: false,
            }
        }
    }

    impl System for Movement {
        fn membership(&self) -> &Membership {
            &self.membership
        }

        fn membership_mut(&mut self) -> &mut Membership {
            &mut self.membership
        }

        fn destroy(&mut self) {
            self.destroyed = true;
        }
    }

    #[test]
    fn test_world_creation() {
        let world = World::with_capacity(KindRegistry::new(), 1000);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.active_entity_count(), 0);
        assert_eq!(world.system_count(), 0);
    }

    #[test]
    fn test_entity_ids_are_sequential_and_never_reused() {
        let mut world = World::new(KindRegistry::new());
        let a = world.add_entity(true).handle();
        let b = world.add_entity(false).handle();
        assert_eq!((a.id().get(), b.id().get()), (0, 1));
        assert_eq!(world.active_entity_count(), 1);

        world.remove_entity(b).unwrap();
        let c = world.add_entity(true).handle();
        assert_eq!(c.id().get(), 2);
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_remove_entity_keeps_active_prefix() {
        let mut world = World::new(KindRegistry::new());
        let a = world.add_entity(true).handle();
        let b = world.add_entity(false).handle();
        world.refresh();
        assert_eq!(world.entity_order(), &[a, b]);

        // Enabled after the refresh, still outside the prefix
        world.entity_mut(b).unwrap().enable();
        world.remove_entity(b).unwrap();
        assert_eq!(world.active_entity_count(), 1);
        assert_eq!(world.entity_order(), &[a]);

        // Disabled after the refresh, still inside the prefix
        let c = world.add_entity(true).handle();
        world.refresh();
        world.entity_mut(a).unwrap().disable();
        world.remove_entity(a).unwrap();
        assert_eq!(world.active_entity_count(), 1);
        assert_eq!(world.entity_order(), &[c]);
    }

    #[test]
    fn test_partition_puts_enabled_first() {
        let mut world = World::new(KindRegistry::new());
        for enabled in [false, true, false, true, true, false] {
            world.add_entity(enabled);
        }

        world.refresh();
        assert_eq!(world.active_entity_count(), 3);

        let flags: Vec<bool> = world
            .entity_order()
            .iter()
            .map(|&handle| world.entity(handle).unwrap().is_enabled())
            .collect();
        assert_eq!(flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn test_partition_all_disabled() {
        let mut world = World::new(KindRegistry::new());
        world.add_entity(false);
        world.add_entity(false);

        world.refresh();
        assert_eq!(world.active_entity_count(), 0);
    }

    #[test]
    fn test_system_lookup() {
        let mut world = World::new(KindRegistry::new());
        assert!(!world.has_system::<Movement>());
        assert!(matches!(
            world.get_system::<Movement>(),
            Err(EcsError::SystemNotFound { .. })
        ));

        world.add_system_with(Movement::new);
        assert!(world.has_system::<Movement>());
        assert!(world.is_system_active::<Movement>());
        assert!(world.get_system_mut::<Movement>().is_ok());
    }

    #[test]
    fn test_remove_system_calls_destroy_and_deactivates() {
        let mut world = World::new(KindRegistry::new());
        world.add_system_with(Movement::new);

        world.remove_system::<Movement>();
        assert!(!world.has_system::<Movement>());
        assert!(!world.update(&FrameTime::default()));

        // Slot identity is kept
        assert_eq!(world.registry().system_count(), 1);
    }

    #[test]
    fn test_entities_with() {
        let mut world = World::new(KindRegistry::new());
        let both = world.add_entity(true);
        both.add_component(Position);
        both.add_component(Velocity);
        let both = both.handle();
        world.add_entity_with_component(Position);

        let registry = world.registry().clone();
        let mask = registry.component_mask(&[
            registry.register_component::<Position>(),
            registry.register_component::<Velocity>(),
        ]);
        assert_eq!(world.entities_with(&mask), vec![both]);
    }

    #[test]
    fn test_destroy_resets_world() {
        let mut world = World::new(KindRegistry::new());
        let old_id = world.id();
        let handle = world.add_entity_with_component(Velocity).handle();
        world.add_system_with(Movement::new);
        world.refresh();

        world.destroy();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.system_count(), 0);
        assert_ne!(world.id(), old_id);
        assert!(world.entity(handle).is_none());

        // Counter restarts, old handle still does not resolve
        let fresh = world.add_entity(true).handle();
        assert_eq!(fresh.id().get(), 0);
        assert!(world.entity(handle).is_none());
    }
}
