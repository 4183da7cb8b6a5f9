//! # Kind Registry
//!
//! Assigns stable, sequential identities to component kinds and system kinds.
//!
//! ```text
//! register_component::<Position>()  -> 0
//! register_component::<Velocity>()  -> 1
//! register_component::<Position>()  -> 0   (cached)
//! register_system::<Movement>()     -> 0   (separate counter)
//! ```
//!
//! The registry is an explicit value, not process-wide state: two registries
//! hand out independent sequences, and [`KindRegistry::reset`] starts over.
//! Cloning a registry clones the *handle*; clones share one table.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::capability::CapabilitySet;
use super::component::{Component, ComponentId};
use super::system::{System, SystemId};

/// One category of kinds (components or systems).
#[derive(Default)]
struct KindTable {
    /// Type tag to identity.
    ids: HashMap<TypeId, usize>,
    /// Type names, indexed by identity.
    names: Vec<&'static str>,
}

impl KindTable {
    fn get<T: 'static>(&self) -> Option<usize> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    fn register<T: 'static>(&mut self) -> usize {
        let tag = TypeId::of::<T>();
        if let Some(&id) = self.ids.get(&tag) {
            return id;
        }

        let id = self.names.len();
        self.names.push(type_name::<T>());
        self.ids.insert(tag, id);
        id
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.names.clear();
    }
}

#[derive(Default)]
struct KindTables {
    components: KindTable,
    systems: KindTable,
}

/// Shared identity table for component and system kinds.
///
/// Every [`World`](super::World) holds a clone of the registry it was built
/// with; an [`Application`](crate::Application) hands the same registry to
/// all of its worlds so a kind has one identity across them.
#[derive(Clone, Default)]
pub struct KindRegistry {
    tables: Arc<RwLock<KindTables>>,
}

impl KindRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity of component kind `K`, allocating the next one
    /// on first registration.
    pub fn register_component<K: Component>(&self) -> ComponentId {
        if let Some(id) = self.tables.read().components.get::<K>() {
            return ComponentId(id);
        }
        ComponentId(self.tables.write().components.register::<K>())
    }

    /// Looks up the identity of component kind `K` without allocating.
    #[must_use]
    pub fn component_id<K: Component>(&self) -> Option<ComponentId> {
        self.tables.read().components.get::<K>().map(ComponentId)
    }

    /// Returns the identity of system kind `S`, allocating the next one on
    /// first registration.
    pub fn register_system<S: System>(&self) -> SystemId {
        if let Some(id) = self.tables.read().systems.get::<S>() {
            return SystemId(id);
        }
        SystemId(self.tables.write().systems.register::<S>())
    }

    /// Looks up the identity of system kind `S` without allocating.
    #[must_use]
    pub fn system_id<S: System>(&self) -> Option<SystemId> {
        self.tables.read().systems.get::<S>().map(SystemId)
    }

    /// Number of registered component kinds.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.tables.read().components.names.len()
    }

    /// Number of registered system kinds.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.tables.read().systems.names.len()
    }

    /// Type name of a registered component kind.
    #[must_use]
    pub fn component_name(&self, id: ComponentId) -> Option<&'static str> {
        self.tables.read().components.names.get(id.0).copied()
    }

    /// Type name of a registered system kind.
    #[must_use]
    pub fn system_name(&self, id: SystemId) -> Option<&'static str> {
        self.tables.read().systems.names.get(id.0).copied()
    }

    /// Builds a capability set with the bits of the given component kinds.
    #[must_use]
    pub fn component_mask(&self, ids: &[ComponentId]) -> CapabilitySet {
        CapabilitySet::from_indices(ids.iter().map(|id| id.index()))
    }

    /// Forgets every identity. The next registration starts again at 0.
    ///
    /// Only meaningful before any world stores data indexed by the old
    /// identities.
    pub fn reset(&self) {
        let mut tables = self.tables.write();
        tables.components.clear();
        tables.systems.clear();
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("KindRegistry")
            .field("components", &tables.components.names)
            .field("systems", &tables.systems.names)
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

    struct Health;
    impl Component for Health {}

    #[derive(Default)]
    struct Physics {
        membership: Membership,
    }

    impl System for Physics {
        fn membership(&self) -> &Membership {
            &self.membership
        }

        fn membership_mut(&mut self) -> &mut Membership {
            &mut self.membership
        }
    }

    #[test]
    fn test_identities_follow_first_request_order() {
        let registry = KindRegistry::new();

        assert_eq!(registry.register_component::<Velocity>().index(), 0);
        assert_eq!(registry.register_component::<Position>().index(), 1);
        assert_eq!(registry.register_component::<Velocity>().index(), 0);
        assert_eq!(registry.register_component::<Health>().index(), 2);
        assert_eq!(registry.component_count(), 3);
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let registry = KindRegistry::new();
        assert_eq!(registry.component_id::<Position>(), None);
        assert_eq!(registry.component_count(), 0);

        let id = registry.register_component::<Position>();
        assert_eq!(registry.component_id::<Position>(), Some(id));
    }

    #[test]
    fn test_system_counter_is_separate() {
        let registry = KindRegistry::new();
        registry.register_component::<Position>();
        registry.register_component::<Velocity>();

        assert_eq!(registry.register_system::<Physics>().index(), 0);
        assert_eq!(registry.system_id::<Physics>().map(SystemId::index), Some(0));
        assert_eq!(registry.system_count(), 1);
    }

    #[test]
    fn test_independent_registries() {
        let first = KindRegistry::new();
        let second = KindRegistry::new();

        first.register_component::<Position>();
        assert_eq!(second.register_component::<Velocity>().index(), 0);
        assert_eq!(first.register_component::<Velocity>().index(), 1);
    }

    #[test]
    fn test_clones_share_table() {
        let registry = KindRegistry::new();
        let handle = registry.clone();

        handle.register_component::<Health>();
        assert_eq!(registry.component_id::<Health>().map(ComponentId::index), Some(0));
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let registry = KindRegistry::new();
        registry.register_component::<Position>();
        registry.register_component::<Velocity>();

        registry.reset();
        assert_eq!(registry.component_count(), 0);
        assert_eq!(registry.register_component::<Velocity>().index(), 0);
    }

    #[test]
    fn test_names_and_masks() {
        let registry = KindRegistry::new();
        let position = registry.register_component::<Position>();
        let health = registry.register_component::<Health>();

        assert!(registry
            .component_name(position)
            .is_some_and(|name| name.ends_with("Position")));

        let mask = registry.component_mask(&[position, health]);
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![0, 1]);
    }
}
