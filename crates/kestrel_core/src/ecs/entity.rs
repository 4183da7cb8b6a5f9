//! # Entity Management
//!
//! An entity is a sequential identity, an enabled flag, and one slot per
//! component kind. Systems never hold an entity directly; they keep an
//! [`EntityHandle`]:
//! - The world the entity belongs to
//! - The storage slot it lives in
//! - Its serial id, which doubles as the slot generation

use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use super::capability::CapabilitySet;
use super::component::{Component, ComponentBox, ComponentBundle};
use super::registry::KindRegistry;
use crate::error::{EcsError, EcsResult};

/// Source of world tags. Tags are unique for the process lifetime.
static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(0);

/// Tag identifying one world (or one lifetime of a world, see
/// [`World::destroy`](super::World::destroy)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldId(u32);

impl WorldId {
    /// Allocates a fresh tag.
    pub(crate) fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw tag value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Sequential per-world entity identity.
///
/// Allocated from a counter that only increases, so an id is never handed
/// out twice by the same world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Generation-checked reference to an entity.
///
/// A handle resolves only while:
/// - it is presented to the world that issued it,
/// - its slot is occupied,
/// - the occupant's id equals the handle's id.
///
/// Removing an entity therefore invalidates every copy of its handle, even
/// after the slot is recycled for a new entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    world: WorldId,
    index: usize,
    id: EntityId,
}

impl EntityHandle {
    #[inline]
    pub(crate) const fn new(world: WorldId, index: usize, id: EntityId) -> Self {
        Self { world, index, id }
    }

    /// The world that issued this handle.
    #[inline]
    #[must_use]
    pub const fn world(self) -> WorldId {
        self.world
    }

    /// Storage slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// The entity's serial id (the slot generation).
    #[inline]
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }
}

/// An entity: enabled flag plus component slots indexed by kind identity.
///
/// Invariant: bit *i* of [`Entity::components`] is set exactly when slot
/// *i* holds a component.
///
/// Entities are created by [`World::add_entity`](super::World::add_entity)
/// and owned by the world's storage; they cannot be cloned.
pub struct Entity {
    handle: EntityHandle,
    enabled: bool,
    components: Vec<Option<ComponentBox>>,
    mask: CapabilitySet,
    registry: KindRegistry,
}

impl Entity {
    pub(crate) fn new(handle: EntityHandle, enabled: bool, registry: KindRegistry) -> Self {
        Self {
            handle,
            enabled,
            components: Vec::new(),
            mask: CapabilitySet::new(),
            registry,
        }
    }

    /// The entity's sequential id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.handle.id
    }

    /// Handle to give to systems or keep across frames.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Whether the entity takes part in the next refresh.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the enabled flag. Systems see the change at the next refresh.
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Enables the entity.
    #[inline]
    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    /// Disables the entity.
    #[inline]
    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// Capability mask of the populated slots.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &CapabilitySet {
        &self.mask
    }

    /// Number of components held.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.mask.count_ones()
    }

    /// Attaches a component, replacing any existing one of the same kind.
    ///
    /// Registers `K` with the world's registry if it was never seen.
    pub fn add_component<K: Component>(&mut self, component: K) -> &mut K {
        let kind = self.registry.register_component::<K>().index();
        if kind >= self.components.len() {
            self.components.resize_with(kind + 1, || None);
        }

        self.components[kind] = Some(Box::new(component));
        self.mask.set(kind, true);

        match self.components[kind]
            .as_deref_mut()
            .and_then(|slot| slot.downcast_mut::<K>())
        {
            Some(component) => component,
            None => unreachable!("slot {kind} was just filled with {}", type_name::<K>()),
        }
    }

    /// Attaches every component in `bundle`.
    pub fn add_components<B: ComponentBundle>(&mut self, bundle: B) -> &mut Self {
        bundle.attach(self);
        self
    }

    /// Returns `true` if a component of kind `K` is attached.
    #[must_use]
    pub fn has_component<K: Component>(&self) -> bool {
        self.registry
            .component_id::<K>()
            .is_some_and(|id| id.index() < self.components.len() && self.mask.get(id.index()))
    }

    /// Returns the attached component of kind `K`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] if no such component is attached.
    pub fn get_component<K: Component>(&self) -> EcsResult<&K> {
        self.slot_index::<K>()
            .and_then(|kind| self.components[kind].as_deref())
            .and_then(|slot| slot.downcast_ref::<K>())
            .ok_or_else(|| self.missing::<K>())
    }

    /// Returns the attached component of kind `K`, mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] if no such component is attached.
    pub fn get_component_mut<K: Component>(&mut self) -> EcsResult<&mut K> {
        let missing = self.missing::<K>();
        match self.slot_index::<K>() {
            Some(kind) => self.components[kind]
                .as_deref_mut()
                .and_then(|slot| slot.downcast_mut::<K>())
                .ok_or(missing),
            None => Err(missing),
        }
    }

    /// Detaches the component of kind `K`. No-op if absent.
    pub fn remove_component<K: Component>(&mut self) {
        if let Some(kind) = self.slot_index::<K>() {
            self.components[kind] = None;
            self.mask.set(kind, false);
        }
    }

    /// Slot index of `K` if a component of that kind is attached.
    fn slot_index<K: Component>(&self) -> Option<usize> {
        if !self.has_component::<K>() {
            return None;
        }
        self.registry.component_id::<K>().map(|id| id.index())
    }

    fn missing<K: Component>(&self) -> EcsError {
        EcsError::ComponentNotFound {
            component: type_name::<K>(),
            entity: self.id(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("handle", &self.handle)
            .field("enabled", &self.enabled)
            .field("components", &self.mask)
            .finish_non_exhaustive()
    }
}
