//! Entity-Component-System
//!
//! Entities are plain ids. Components are type-erased values created from
//! structured data through per-type allocators. Systems are notified when an
//! entity joins or leaves them. The [`World`] ties the three registries
//! together with the collision engine.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod storage;
pub mod system;
pub mod world;

pub use component::{Component, ComponentAllocator, FnAllocator, SerdeAllocator};
pub use entity::{Entity, EntityRegistry};
pub use error::{EcsError, EcsResult};
pub use storage::{ComponentHandle, ComponentKey, ComponentStore};
pub use system::{FnSystem, System, SystemRegistry};
pub use world::World;
