//! # Entity Component System
//!
//! Data side of the runtime: entities, component pools and the world that
//! ties them together.
//!
//! ## Design Philosophy
//!
//! - One chunked pool per component type, addressed by dense ids
//! - Entity rows keep active entities in a contiguous prefix
//! - Components are `Pod`, so generic code can move them as bytes
//! - No globals: every registry belongs to one world

mod component;
mod entity;
mod singleton;
mod storage;
mod table;
mod world;

pub use component::{Component, ComponentMask, ComponentType, ComponentTypeId, MAX_COMPONENTS};
pub use entity::{Entity, EntityRecord};
pub use singleton::{Singleton, SingletonRegistry, SingletonTypeId, MAX_SINGLETONS};
pub use storage::{ComponentCatalog, ComponentRegistry};
pub use table::EntityTable;
pub use world::{ComponentRow, World};
