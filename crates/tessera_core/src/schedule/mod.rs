//! # Scheduling
//!
//! Behavior side of the runtime: systems, their access declarations, the
//! deferred mod queue, and the dispatcher that runs them over a world.

mod context;
mod dispatcher;
mod mod_queue;
mod system;

pub use context::{SystemContext, SystemEntity};
pub use dispatcher::Dispatcher;
pub use mod_queue::{Mod, ModQueue, ModStats, ModTarget, PendingEntity};
pub use system::{
    Access, Existence, System, SystemRegistry, SystemSetup, SystemType, SystemTypeId, TimeDelta,
};
