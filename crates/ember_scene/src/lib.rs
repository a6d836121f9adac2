//! # ember_scene
//!
//! The entity-component-scene core of the ember engine: dynamic game state
//! as entities and typed component fragments, created, stored, mutated,
//! serialised, and destroyed each frame.
//!
//! This crate provides:
//!
//! - [`EntityPool`] — slot-recycling arena of entity records.
//! - [`ComponentPool`] — dense per-type component storage.
//! - [`EntityHandle`] / [`ComponentHandle`] — weak references that safely
//!   report their own invalidity.
//! - [`Registries`] — component/system/scene type registries mapping names
//!   and dense numeric ids to factories.
//! - [`System`] — per-scene logic observing lifecycle hooks.
//! - [`Scene`] — the aggregate root orchestrating creation, activation,
//!   destruction, cloning, and document encode/decode.
//! - [`AssetSource`] — the path → document contract used for archetype
//!   inclusion.
//!
//! The core is single-threaded per scene and unsynchronised; see the
//! [`System`] docs for the wait-then-mutate rule when systems overlap work
//! with an external task facility.

pub mod assets;
pub mod component;
pub mod component_pool;
pub mod entity;
pub mod entity_pool;
pub mod error;
pub mod handle;
mod id_pool;
pub mod registry;
pub mod scene;
pub mod system;

pub use assets::{AssetSource, DirAssets, MemoryAssets, NoAssets};
pub use component::{Component, ComponentId, ComponentTypeId};
pub use component_pool::{AnyComponentPool, ComponentPool};
pub use entity::{Entity, EntityId};
pub use entity_pool::EntityPool;
pub use error::InvalidOperation;
pub use handle::{ComponentHandle, EntityHandle};
pub use registry::{ComponentRegistry, Registries, SceneRegistry, SystemRegistry};
pub use scene::{Scene, SceneTypeId};
pub use system::{System, SystemTypeId};
