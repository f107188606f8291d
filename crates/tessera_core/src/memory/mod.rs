//! # Memory Management
//!
//! Chunked arenas and slot pools backing every component type.
//!
//! ## Design Philosophy
//!
//! - Storage grows by whole chunks, never by reallocating old ones
//! - Slots are plain indices, stable until destroyed
//! - Freed slots are reused before the arena grows

mod arena;
mod pool;

pub use arena::{BlockArena, DEFAULT_CHUNK_LEN, MAX_COMPONENT_ALIGN};
pub use pool::{ObjectPool, SlotIndex, INVALID_SLOT};
