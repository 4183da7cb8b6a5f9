//! # Component Kinds
//!
//! Components are plain data (or data plus behavior) attached to entities.
//! Every concrete component type is one *kind*; a [`KindRegistry`] maps each
//! kind to a small sequential [`ComponentId`], which is the kind's slot in
//! entity storage and its bit in capability sets.
//!
//! [`KindRegistry`]: super::KindRegistry

use std::any::Any;
use std::fmt;

use super::entity::Entity;

/// Marker trait for ECS components.
///
/// Components must be `'static` (so they can be identified by `TypeId`)
/// and `Send + Sync` (so a whole world can move between threads between
/// ticks).
///
/// # Example
///
/// ```rust
/// use kestrel_core::Component;
///
/// struct Health(u32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Any + Send + Sync {}

/// Boxed, type-erased component instance as stored in an entity slot.
pub(crate) type ComponentBox = Box<dyn Any + Send + Sync>;

/// Identity of a component kind within one registry.
///
/// Identities are dense: the first registered kind is 0, the next 1, and so
/// on. They are never reused while the registry lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    /// Returns the slot / bit index of this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// A tuple of components attached in one call.
///
/// Implemented for tuples of up to eight distinct component kinds. Elements
/// are attached left to right, so a repeated kind keeps its last value.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Component, KindRegistry, World};
///
/// struct Health(u32);
/// impl Component for Health {}
/// struct Armor;
/// impl Component for Armor {}
///
/// let mut world = World::new(KindRegistry::new());
/// let entity = world.add_entity_with_components(true, (Health(10), Armor));
/// assert!(entity.has_component::<Armor>());
/// ```
pub trait ComponentBundle {
    /// Attaches every element to `entity`.
    fn attach(self, entity: &mut Entity);
}

macro_rules! impl_component_bundle {
    ($($kind:ident),+) => {
        impl<$($kind: Component),+> ComponentBundle for ($($kind,)+) {
            #[allow(non_snake_case)]
            fn attach(self, entity: &mut Entity) {
                let ($($kind,)+) = self;
                $(entity.add_component($kind);)+
            }
        }
    };
}

impl_component_bundle!(A);
impl_component_bundle!(A, B);
impl_component_bundle!(A, B, C);
impl_component_bundle!(A, B, C, D);
impl_component_bundle!(A, B, C, D, E);
impl_component_bundle!(A, B, C, D, E, F);
impl_component_bundle!(A, B, C, D, E, F, G);
impl_component_bundle!(A, B, C, D, E, F, G, H);
