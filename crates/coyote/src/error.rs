//! ECS error types.

use thiserror::Error;

use crate::{
    component::ComponentId,
    handle::{ComponentHandle, EntityHandle},
};

/// Error returned by world, entity and component operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// A stale, destroyed or never-issued handle was used.
    #[error("invalid {kind} handle {bits:#x}")]
    InvalidHandle {
        /// Which handle space the value belongs to ("entity", "component", "world").
        kind: &'static str,
        /// Packed handle value as passed by the caller.
        bits: u64,
    },

    /// The descriptor names a different type than the component was created with.
    #[error("component {component} has type {actual:?}, descriptor names {expected:?}")]
    TypeMismatch {
        component: ComponentHandle,
        expected: ComponentId,
        actual: ComponentId,
    },

    /// The entity already holds a component of this type.
    #[error("entity {entity} already holds a {type_id:?} component")]
    AlreadyAttached {
        entity: EntityHandle,
        type_id: ComponentId,
    },

    /// Detach of a pair that is not related.
    #[error("component {component} is not attached to entity {entity}")]
    NotAttached {
        entity: EntityHandle,
        component: ComponentHandle,
    },

    /// A handle space or configured limit is used up.
    #[error("{resource} exhausted")]
    ResourceExhausted { resource: &'static str },

    /// A type id was reused with a different byte size.
    #[error("type {type_id:?} is stored with size {expected}, got {actual}")]
    SizeMismatch {
        type_id: ComponentId,
        expected: usize,
        actual: usize,
    },

    /// Typed access with a Rust type whose size differs from the descriptor.
    #[error("type {type_id:?} has size {expected}, accessed as a {actual}-byte value")]
    LayoutMismatch {
        type_id: ComponentId,
        expected: usize,
        actual: usize,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
