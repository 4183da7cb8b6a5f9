//! # Entity Component System
//!
//! Entities hold components; systems declare the components they require;
//! worlds match the two at every refresh.
//!
//! ## Design Philosophy
//!
//! - Kind identities come from an explicit [`KindRegistry`]
//! - Capabilities are bit sets indexed by kind identity
//! - Systems refer to entities through generation-checked handles
//! - Membership is re-derived at refresh, not pushed by events

mod capability;
mod component;
mod entity;
mod registry;
mod storage;
mod system;
mod world;

pub use capability::{CapabilitySet, Ones};
pub use component::{Component, ComponentBundle, ComponentId};
pub use entity::{Entity, EntityHandle, EntityId, WorldId};
pub use registry::KindRegistry;
pub use storage::EntityStorage;
pub use system::{Membership, System, SystemId};
pub use world::World;
