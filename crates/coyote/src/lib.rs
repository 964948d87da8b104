#![forbid(unsafe_code)]
// Allow missing docs for now
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! Coyote ECS - type-erased Entity Component System
//!
//! Component layouts are supplied by the host at runtime as
//! [`TypeDescriptor`]s (id, size, name). The engine stores component
//! records as opaque bytes in one pool per type and never interprets them.
//!
//! # Key Concepts
//!
//! - **Entity**: An identifier holding zero or more attached components
//! - **Component**: A fixed-size byte record of one type, stored in a pool
//! - **Attachment**: Links an entity to at most one component per type
//! - **Handle**: Generational index; stale handles are always rejected
//! - **GC**: Destroy marks a slot dead; [`World::gc`] reclaims it later
//!
//! Components live independently of entities: destroying an entity only
//! detaches its components.
//!
//! # Example
//!
//! ```
//! use coyote::{TypeDescriptor, World, type_descriptor};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
//! struct Apple {
//!     weight: f32,
//! }
//!
//! const APPLE: TypeDescriptor = type_descriptor!(0, Apple);
//!
//! let mut world = World::new();
//! let tree = world.entity_create()?;
//! let apple = world.component_create(&APPLE)?;
//! world.component_write(apple, &APPLE, &Apple { weight: 0.2 })?;
//! world.attach(tree, apple, &APPLE)?;
//!
//! world.entity_destroy(tree)?;
//! assert_eq!(world.entities_count(), 0);
//! assert_eq!(world.components_count(), 1);
//! # Ok::<(), coyote::EcsError>(())
//! ```
//!
//! # Threading
//!
//! A world is meant to be driven from one thread at a time. Mutating
//! methods take `&mut self`; hosts sharing a world across threads must add
//! their own locking.

mod component;
mod config;
mod entity;
mod error;
mod gc;
mod handle;
mod query;
mod storage;
mod universe;
mod world;

pub use component::{ComponentId, TypeDescriptor};
pub use config::{GcPolicy, WorldConfig};
pub use entity::Attachment;
pub use error::{EcsError, EcsResult};
pub use gc::GcStats;
pub use handle::{ComponentHandle, EntityHandle, Generation, Handle, RawHandle, WorldHandle};
pub use query::{ComponentCursor, ComponentIter, EntityCursor, EntityIter};
pub use storage::{Pool, Slot};
pub use universe::Universe;
pub use world::{ComponentLocation, World};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ComponentHandle, EcsError, EcsResult, EntityHandle, TypeDescriptor, Universe, World,
        WorldHandle, type_descriptor,
    };
}
