//! # Dispatcher
//!
//! Owns a [`World`] and drives its systems.
//!
//! ## Update Flow
//!
//! ```text
//!   for each system, in registration order:
//!     ┌──────────────────────┐   ┌──────────────┐   ┌───────────────────┐
//!     │ collect active rows  │──▶│ system.update│──▶│ apply mod queue   │
//!     │ matching `required`  │   │ (ctx, mods)  │   │ (structural edits)│
//!     └──────────────────────┘   └──────────────┘   └───────────────────┘
//! ```
//!
//! The matched rows are frozen before the system runs, and structural
//! changes only land after it returns. The next system sees them.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::context::SystemContext;
use super::mod_queue::ModQueue;
use super::system::{System, SystemRegistry, SystemType, SystemTypeId, TimeDelta};
use crate::config::WorldConfig;
use crate::ecs::World;

/// World plus the systems that run over it.
///
/// Derefs to [`World`] for registration, entity lifecycle and component
/// access between updates.
///
/// # Example
///
/// ```rust,ignore
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register_component::<Position>();
/// dispatcher.register_system(Movement);
/// dispatcher.initialize();
///
/// loop {
///     dispatcher.update(1.0 / 60.0);
/// }
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    /// Simulation state.
    world: World,
    /// Systems in run order.
    systems: SystemRegistry,
    /// Shared deferred-mod log, drained after every system.
    mods: ModQueue,
    /// Matched rows of the running system.
    matches: Vec<usize>,
    /// Set once `initialize` has run.
    initialized: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Creates a dispatcher over an empty world built from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config.pool_chunk_len` is zero.
    #[must_use]
    pub fn with_config(config: &WorldConfig) -> Self {
        let world = World::with_config(config);
        let catalog = Arc::clone(world.components().catalog());
        let mods = ModQueue::with_capacity(catalog, config.mod_queue_capacity);
        Self {
            world,
            systems: SystemRegistry::new(),
            mods,
            matches: Vec::with_capacity(config.entity_capacity),
            initialized: false,
        }
    }

    /// Returns the world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world mutably.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Adds `system` to the end of the run order.
    ///
    /// After [`initialize`](Self::initialize) the system is initialized
    /// right away.
    ///
    /// # Panics
    ///
    /// Panics if a system of type `S` is already registered.
    #[track_caller]
    pub fn register_system<S: System>(&mut self, system: S) -> SystemTypeId {
        let id = self.systems.register(system);
        if self.initialized {
            self.systems.initialize(id, &self.world);
        }
        id
    }

    /// Returns the descriptor of system `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this dispatcher.
    #[must_use]
    #[track_caller]
    pub fn system_type(&self, id: SystemTypeId) -> &SystemType {
        self.systems.get(id)
    }

    /// Returns the id of system type `S`, if registered.
    #[must_use]
    pub fn system_id<S: System>(&self) -> Option<SystemTypeId> {
        self.systems.id_of::<S>()
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns true once [`initialize`](Self::initialize) has run.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Lets every registered system declare its dependencies.
    ///
    /// Calling it again does nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        let ids: Vec<_> = self.systems.iter().map(SystemType::id).collect();
        for id in ids {
            self.systems.initialize(id, &self.world);
        }
        self.initialized = true;
        tracing::debug!(systems = self.systems.len(), "dispatcher initialized");
    }

    /// Runs every system once, in registration order.
    ///
    /// Each system sees the active entities matching its required
    /// components as of the start of its pass. Its queued mods are applied
    /// before the next system runs.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize`](Self::initialize).
    #[track_caller]
    pub fn update(&mut self, delta: TimeDelta) {
        assert!(self.initialized, "Dispatcher updated before initialize");
        self.mods.attach(Arc::clone(self.world.components().catalog()));

        for entry in self.systems.entries_mut() {
            self.world
                .entities()
                .collect_matching(entry.kind.required(), &mut self.matches);

            let mut ctx = SystemContext::new(&mut self.world, &entry.kind, &self.matches);
            entry.system.update(&mut ctx, &mut self.mods, delta);

            let stats = self.mods.apply(&mut self.world);
            tracing::trace!(
                system = entry.kind.name(),
                matched = self.matches.len(),
                applied = stats.applied,
                dropped = stats.dropped,
                "system updated"
            );
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Dispatcher {
    type Target = World;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.world
    }
}

impl DerefMut for Dispatcher {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Access, SystemSetup};

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Counter(u32);

    /// Increments every counter.
    struct Tick;

    impl System for Tick {
        fn initialize(&mut self, setup: &mut SystemSetup<'_>) {
            setup.require::<Counter>(Access::Write);
        }

        fn update(&mut self, ctx: &mut SystemContext<'_>, _mods: &mut ModQueue, _delta: TimeDelta) {
            ctx.for_each(|mut e| {
                if let Some(counter) = e.write::<Counter>() {
                    counter.0 += 1;
                }
            });
        }
    }

    /// Spawns one counter entity per update.
    struct Spawner;

    impl System for Spawner {
        fn initialize(&mut self, _setup: &mut SystemSetup<'_>) {}

        fn update(&mut self, _ctx: &mut SystemContext<'_>, mods: &mut ModQueue, _delta: TimeDelta) {
            let e = mods.create(true);
            mods.set_component(e, Counter(0));
        }
    }

    #[test]
    fn test_update_runs_systems_in_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_component::<Counter>();
        dispatcher.register_system(Spawner);
        dispatcher.register_system(Tick);
        dispatcher.initialize();

        dispatcher.update(0.016);
        dispatcher.update(0.016);

        // The first spawn has been ticked twice, the second once.
        let mut counts = Vec::new();
        dispatcher.for_each::<Counter>(|_, c| counts.push(c.0));
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn test_register_after_initialize() {
        let mut dispatcher = Dispatcher::new();
        let counter = dispatcher.register_component::<Counter>();
        dispatcher.initialize();
        assert!(dispatcher.is_initialized());

        let tick = dispatcher.register_system(Tick);
        assert!(dispatcher.system_type(tick).required().contains(counter));
        assert_eq!(dispatcher.system_id::<Tick>(), Some(tick));
        assert_eq!(dispatcher.system_count(), 1);
    }

    #[test]
    #[should_panic(expected = "system type already registered")]
    fn test_duplicate_system_panics() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_system(Spawner);
        dispatcher.register_system(Spawner);
    }

    #[test]
    #[should_panic(expected = "before initialize")]
    fn test_update_requires_initialize() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.update(0.0);
    }

    #[test]
    fn test_component_registered_after_initialize_reaches_queue() {
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        #[repr(C)]
        #[allow(dead_code)]
        struct Late(u8);

        struct UsesLate;

        impl System for UsesLate {
            fn initialize(&mut self, _setup: &mut SystemSetup<'_>) {}

            fn update(&mut self, _ctx: &mut SystemContext<'_>, mods: &mut ModQueue, _delta: TimeDelta) {
                let e = mods.create(false);
                mods.set_component(e, Late(1));
            }
        }

        let mut dispatcher = Dispatcher::new();
        dispatcher.register_system(UsesLate);
        dispatcher.initialize();
        dispatcher.register_component::<Late>();
        dispatcher.update(0.0);

        assert_eq!(dispatcher.entity_count(), 1);
        assert_eq!(dispatcher.active_entity_count(), 0);
    }
}
