//! # KESTREL Core Runtime
//!
//! Fixed-timestep Entity Component System (ECS) runtime:
//! - Entities gain and lose components at any time
//! - Systems are re-matched to entities at every refresh
//! - An application drives several worlds with fixed substeps
//!
//! ## Architecture Rules
//!
//! 1. **Single-threaded tick** - systems run in slot order, worlds in insertion order
//! 2. **Explicit identities** - kind ids come from a registry value, never from globals
//! 3. **No dangling members** - systems hold handles, removal unlinks first
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::{Application, Component, Membership, System};
//!
//! struct Lifetime(u32);
//! impl Component for Lifetime {}
//!
//! struct Countdown {
//!     membership: Membership,
//! }
//!
//! impl System for Countdown {
//!     fn membership(&self) -> &Membership { &self.membership }
//!     fn membership_mut(&mut self) -> &mut Membership { &mut self.membership }
//!
//!     fn update(
//!         &mut self,
//!         _frame: &kestrel_core::FrameTime,
//!         entities: &mut kestrel_core::EntityStorage,
//!     ) -> bool {
//!         let mut alive = false;
//!         for &handle in self.membership.members() {
//!             if let Some(lifetime) = entities
//!                 .get_mut(handle)
//!                 .and_then(|entity| entity.get_component_mut::<Lifetime>().ok())
//!             {
//!                 lifetime.0 = lifetime.0.saturating_sub(1);
//!                 alive |= lifetime.0 > 0;
//!             }
//!         }
//!         alive
//!     }
//! }
//!
//! let mut app = Application::new(1);
//! let world = app.add_world();
//! world.add_system_with(|registry| Countdown {
//!     membership: Membership::new().with_component::<Lifetime>(registry),
//! });
//! world.add_entity_with_component(Lifetime(3));
//!
//! let mut ticks = 0;
//! while app.tick(0.016) {
//!     ticks += 1;
//! }
//! assert_eq!(ticks, 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod ecs;
pub mod error;

pub use app::{Application, FrameClock, FrameTime, DEFAULT_SUBSTEP_TIME};
pub use ecs::{
    CapabilitySet, Component, ComponentBundle, ComponentId, Entity, EntityHandle, EntityId,
    EntityStorage, KindRegistry, Membership, System, SystemId, World, WorldId,
};
pub use error::{EcsError, EcsResult};
