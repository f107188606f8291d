//! # Tessera Core
//!
//! Entity Component System runtime with deferred structural changes:
//! - Chunked, slot-reusing pools for every component type
//! - Active/inactive entity partition kept contiguous by O(1) swaps
//! - Per-system access masks checked on every component access
//! - A mod queue that lets systems create and destroy while iterating
//!
//! ## Architecture Rules
//!
//! 1. **Components are plain data** - `Pod` values, moved as bytes
//! 2. **Systems never reshape the world directly** - they record mods
//! 3. **One thread drives a world** - systems run in registration order
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Access, Dispatcher, ModQueue, System, SystemContext, SystemSetup, TimeDelta};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_component::<Position>();
//! dispatcher.register_system(Movement);
//! dispatcher.initialize();
//!
//! let entity = dispatcher.create(true);
//! dispatcher.add_component(entity, Position { x: 0.0, y: 0.0 });
//! dispatcher.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod schedule;

pub use config::WorldConfig;
pub use ecs::{
    Component, ComponentCatalog, ComponentMask, ComponentRegistry, ComponentRow, ComponentType,
    ComponentTypeId, Entity, EntityRecord, EntityTable, Singleton, SingletonRegistry,
    SingletonTypeId, World, MAX_COMPONENTS, MAX_SINGLETONS,
};
pub use error::{EcsError, EcsResult};
pub use memory::{BlockArena, ObjectPool, SlotIndex, DEFAULT_CHUNK_LEN, INVALID_SLOT};
pub use schedule::{
    Access, Dispatcher, Existence, Mod, ModQueue, ModStats, ModTarget, PendingEntity, System,
    SystemContext, SystemEntity, SystemRegistry, SystemSetup, SystemType, SystemTypeId,
    TimeDelta,
};
