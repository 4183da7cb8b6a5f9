//! # Runtime Error Types
//!
//! All recoverable errors raised by the ECS runtime. Contract violations
//! (out-of-range capability indices, a non-positive fixed step) are
//! assertions, not variants here.

use thiserror::Error;

use crate::ecs::{EntityId, WorldId};

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity does not have a component of the requested kind.
    #[error("component {component} not found on {entity}")]
    ComponentNotFound {
        /// Type name of the requested component.
        component: &'static str,
        /// The entity that was asked.
        entity: EntityId,
    },

    /// The world has no system of the requested kind.
    #[error("system {system} not found")]
    SystemNotFound {
        /// Type name of the requested system.
        system: &'static str,
    },

    /// The handle does not refer to a live entity of this world.
    #[error("{entity} is not owned by {world}")]
    EntityNotOwned {
        /// Id carried by the rejected handle.
        entity: EntityId,
        /// The world that was asked.
        world: WorldId,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
