//! ECS error taxonomy
//!
//! Every variant is fatal to the operation that raised it. Scene loading and
//! the frame loop propagate these upward unchanged; nothing retries.

use super::Entity;
use thiserror::Error;

/// Result alias used throughout the ECS and collision engine
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised by the entity/component/system registries and the collision engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// `add_component` for a type nobody registered an allocator for
    #[error("no allocator registered for component type '{type_name}'")]
    UnknownComponentType {
        /// Requested component type
        type_name: String,
    },

    /// Access to a component the entity does not have (or a stale handle)
    #[error("entity {entity} has no '{type_name}' component")]
    MissingComponent {
        /// Entity queried
        entity: Entity,
        /// Component type queried
        type_name: String,
    },

    /// Typed access asked for a different Rust type than the one stored
    #[error("component '{type_name}' on entity {entity} is not a {expected}")]
    ComponentTypeMismatch {
        /// Entity queried
        entity: Entity,
        /// Component type name
        type_name: String,
        /// Rust type the caller asked for
        expected: &'static str,
    },

    /// The allocator rejected the structured input
    #[error("invalid data for component '{type_name}': {reason}")]
    InvalidComponentData {
        /// Component type being allocated
        type_name: String,
        /// Allocator's explanation
        reason: String,
    },

    /// A configured prerequisite component is not attached yet
    #[error("component '{component}' on entity {entity} requires '{requires}' to be attached first")]
    MissingComponentDependency {
        /// Entity receiving the component
        entity: Entity,
        /// Component being attached
        component: String,
        /// Prerequisite that is absent
        requires: String,
    },

    /// Subscribe/unsubscribe named a system nobody registered
    #[error("no system registered under '{name}'")]
    UnknownSystem {
        /// Requested system name
        name: String,
    },

    /// A system tried to (un)subscribe an entity to itself from inside its own callback
    #[error("system '{name}' is busy handling another entity")]
    SystemBusy {
        /// System name
        name: String,
    },

    /// Entity already in the system's subscription list
    #[error("entity {entity} is already subscribed to system '{system}'")]
    AlreadySubscribed {
        /// Entity
        entity: Entity,
        /// System name
        system: String,
    },

    /// Entity not in the system's subscription list
    #[error("entity {entity} is not subscribed to system '{system}'")]
    NotSubscribed {
        /// Entity
        entity: Entity,
        /// System name
        system: String,
    },

    /// `get_entity` found no entity with that id string
    #[error("no entity has id '{id}'")]
    EntityNotFound {
        /// Id string searched for
        id: String,
    },

    /// A collider names a handler that was never registered
    #[error("collider on entity {entity} names unknown collision handler '{name}'")]
    UnknownCollisionHandler {
        /// Entity owning the collider
        entity: Entity,
        /// Handler name
        name: String,
    },

    /// A content-code collision handler failed
    #[error("collision handler of entity {entity} failed: {message}")]
    Handler {
        /// Entity whose handler failed
        entity: Entity,
        /// Handler's explanation
        message: String,
    },
}

impl EcsError {
    pub(crate) fn missing(entity: Entity, type_name: &str) -> Self {
        Self::MissingComponent {
            entity,
            type_name: type_name.to_string(),
        }
    }
}
