//! # Systems
//!
//! A system declares the component kinds it requires and, once per frame,
//! processes the entities the world matched to it.
//!
//! ```text
//! required:  [ 0, 1, 1 ]      (Velocity | Position)
//! entity A:  [ 1, 0, 1 ]  ->  intersects, linked
//! entity B:  [ 1, 0, 0 ]  ->  disjoint, not linked
//! ```
//!
//! Matching is by intersection: an entity qualifies if it holds *any*
//! required kind. Systems that need several kinds at once check for the
//! rest in their update.

use std::any::Any;
use std::fmt;

use super::capability::CapabilitySet;
use super::component::Component;
use super::entity::EntityHandle;
use super::registry::KindRegistry;
use super::storage::EntityStorage;
use crate::app::FrameTime;

/// Identity of a system kind within one registry; also its world slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub(crate) usize);

impl SystemId {
    /// Returns the slot index of this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Required-capability mask plus the list of matched entities.
///
/// Every system embeds one and exposes it through
/// [`System::membership`] / [`System::membership_mut`].
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Component, KindRegistry, Membership};
///
/// struct Position;
/// impl Component for Position {}
///
/// let registry = KindRegistry::new();
/// let membership = Membership::new().with_component::<Position>(&registry);
/// assert!(membership.required_components().get(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Membership {
    required: CapabilitySet,
    members: Vec<EntityHandle>,
}

impl Membership {
    /// Creates a membership with no requirements and no members.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            required: CapabilitySet::new(),
            members: Vec::new(),
        }
    }

    /// Builder form of [`Membership::register_component`].
    #[must_use]
    pub fn with_component<K: Component>(mut self, registry: &KindRegistry) -> Self {
        self.register_component::<K>(registry);
        self
    }

    /// Adds `K` to the required kinds.
    pub fn register_component<K: Component>(&mut self, registry: &KindRegistry) {
        let id = registry.register_component::<K>();
        self.required.set(id.index(), true);
    }

    /// Removes `K` from the required kinds.
    ///
    /// Current members stay linked until the next refresh re-evaluates them.
    pub fn unregister_component<K: Component>(&mut self, registry: &KindRegistry) {
        if let Some(id) = registry.component_id::<K>() {
            self.required.set(id.index(), false);
        }
    }

    /// The required-capability mask.
    #[inline]
    #[must_use]
    pub const fn required_components(&self) -> &CapabilitySet {
        &self.required
    }

    /// Handles of the matched entities, in link order.
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[EntityHandle] {
        &self.members
    }

    /// Number of matched entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no entity is matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Linear scan for `entity`.
    #[must_use]
    pub fn contains(&self, entity: EntityHandle) -> bool {
        self.members.contains(&entity)
    }

    /// Appends `entity` to the member list.
    pub fn link(&mut self, entity: EntityHandle) {
        self.members.push(entity);
    }

    /// Removes the first occurrence of `entity`, keeping the order of the rest.
    pub fn unlink(&mut self, entity: EntityHandle) {
        if let Some(position) = self.members.iter().position(|&member| member == entity) {
            self.members.remove(position);
        }
    }

    /// Drops every member; requirements are kept.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// A per-frame processing unit.
///
/// Implementors provide access to their [`Membership`] and usually override
/// [`System::update`]. The link/unlink hooks can be overridden to keep
/// extra per-member state in sync.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Component, EntityStorage, FrameTime, KindRegistry, Membership, System};
///
/// struct Health(i32);
/// impl Component for Health {}
///
/// struct Regen {
///     membership: Membership,
/// }
///
/// impl Regen {
///     fn new(registry: &KindRegistry) -> Self {
///         Self { membership: Membership::new().with_component::<Health>(registry) }
///     }
/// }
///
/// impl System for Regen {
///     fn membership(&self) -> &Membership { &self.membership }
///     fn membership_mut(&mut self) -> &mut Membership { &mut self.membership }
///
///     fn update(&mut self, _frame: &FrameTime, entities: &mut EntityStorage) -> bool {
///         for &handle in self.membership.members() {
///             if let Some(health) = entities
///                 .get_mut(handle)
///                 .and_then(|entity| entity.get_component_mut::<Health>().ok())
///             {
///                 health.0 += 1;
///             }
///         }
///         true
///     }
/// }
/// # let _ = Regen::new(&KindRegistry::new());
/// ```
pub trait System: Any + Send {
    /// The system's requirements and members.
    fn membership(&self) -> &Membership;

    /// The system's requirements and members, mutably.
    fn membership_mut(&mut self) -> &mut Membership;

    /// Runs one frame over the current members.
    ///
    /// Returning `false` deactivates the system for good: its world will
    /// neither refresh nor update it again.
    fn update(&mut self, _frame: &FrameTime, _entities: &mut EntityStorage) -> bool {
        true
    }

    /// Called when the system leaves its world (removal or world teardown).
    fn destroy(&mut self) {}

    /// The required-capability mask.
    fn required_components(&self) -> &CapabilitySet {
        self.membership().required_components()
    }

    /// Returns `true` if `entity` is currently a member. O(members).
    fn contains_entity(&self, entity: EntityHandle) -> bool {
        self.membership().contains(entity)
    }

    /// Adds `entity` to the members.
    fn link_entity(&mut self, entity: EntityHandle) {
        self.membership_mut().link(entity);
    }

    /// Removes `entity` from the members.
    fn unlink_entity(&mut self, entity: EntityHandle) {
        self.membership_mut().unlink(entity);
    }
}

/// Object-safe view of a stored system with downcasting.
pub(crate) trait AnySystem: System {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> AnySystem for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
