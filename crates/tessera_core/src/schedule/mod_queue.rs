//! # Mod Queue
//!
//! Deferred structural changes recorded by a system while it iterates.
//!
//! A system cannot create, destroy or reshape entities while it holds the
//! world; it records [`Mod`]s here instead. The dispatcher applies them in
//! append order right after the system's pass.
//!
//! Entities created inside the queue do not exist yet, so they are named by
//! a [`PendingEntity`]. Later mods in the same batch can target it; replay
//! binds it to the real [`Entity`] when the `Create` (or `Copy`) runs.
//!
//! Replay is lenient: a mod whose target no longer exists (destroyed earlier
//! in the batch, or never created) is dropped without error.

use std::sync::Arc;

use crate::ecs::{Component, ComponentCatalog, ComponentTypeId, Entity, World};
use crate::error::{EcsError, EcsResult, OrPanic};

/// Logical id of an entity created through a [`ModQueue`].
///
/// Only meaningful until the queue is applied; the counter restarts at zero
/// for the next batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PendingEntity(u32);

impl PendingEntity {
    /// Returns the logical index within the batch.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The entity a mod applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModTarget {
    /// An entity that already exists in the world.
    Existing(Entity),
    /// An entity created earlier in the same batch.
    Pending(PendingEntity),
}

impl From<Entity> for ModTarget {
    fn from(entity: Entity) -> Self {
        Self::Existing(entity)
    }
}

impl From<PendingEntity> for ModTarget {
    fn from(pending: PendingEntity) -> Self {
        Self::Pending(pending)
    }
}

/// One recorded structural change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mod {
    /// Create an empty entity.
    Create {
        /// Logical id bound on replay.
        pending: PendingEntity,
        /// Start in the active partition.
        active: bool,
    },
    /// Duplicate an entity and all its components.
    Copy {
        /// Logical id bound on replay.
        pending: PendingEntity,
        /// Entity to duplicate.
        source: ModTarget,
        /// Start in the active partition.
        active: bool,
    },
    /// Destroy an entity.
    Destroy(ModTarget),
    /// Add or overwrite a component.
    SetComponent {
        /// Entity to modify.
        target: ModTarget,
        /// Component type.
        component: ComponentTypeId,
        /// Component value, exactly the registered size.
        payload: Box<[u8]>,
    },
    /// Remove a component if present.
    RemoveComponent {
        /// Entity to modify.
        target: ModTarget,
        /// Component type.
        component: ComponentTypeId,
    },
}

/// Outcome of [`ModQueue::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModStats {
    /// Mods that changed the world.
    pub applied: usize,
    /// Mods dropped because their target did not exist.
    pub dropped: usize,
}

/// Append-only log of deferred mods.
///
/// # Example
///
/// ```rust,ignore
/// let mut mods = ModQueue::for_world(&world);
///
/// let bullet = mods.create(true);
/// mods.set_component(bullet, Position { x: 0.0, y: 0.0 });
/// mods.destroy(shooter);
///
/// let stats = mods.apply(&mut world);
/// assert_eq!(stats.applied, 3);
/// ```
#[derive(Debug)]
pub struct ModQueue {
    /// Component types, shared with the world's registry.
    catalog: Arc<ComponentCatalog>,
    /// Recorded mods in append order.
    mods: Vec<Mod>,
    /// Next logical id.
    next_pending: u32,
    /// Logical id → real entity, filled during replay.
    resolved: Vec<Option<Entity>>,
}

impl ModQueue {
    /// Creates an empty queue resolving component types through `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        Self::with_capacity(catalog, 0)
    }

    /// Creates an empty queue with room for `capacity` mods.
    #[must_use]
    pub fn with_capacity(catalog: Arc<ComponentCatalog>, capacity: usize) -> Self {
        Self {
            catalog,
            mods: Vec::with_capacity(capacity),
            next_pending: 0,
            resolved: Vec::new(),
        }
    }

    /// Creates an empty queue for `world`'s component types.
    #[must_use]
    pub fn for_world(world: &World) -> Self {
        Self::new(Arc::clone(world.components().catalog()))
    }

    /// Replaces the component catalog, picking up newly registered types.
    pub fn attach(&mut self, catalog: Arc<ComponentCatalog>) {
        self.catalog = catalog;
    }

    /// Returns the number of recorded mods.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Returns true if nothing is recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Returns the number of logical ids issued in this batch.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.next_pending as usize
    }

    /// Returns the recorded mods in append order.
    #[inline]
    #[must_use]
    pub fn mods(&self) -> &[Mod] {
        &self.mods
    }

    /// Discards every recorded mod and restarts logical ids.
    pub fn clear(&mut self) {
        self.mods.clear();
        self.next_pending = 0;
    }

    /// Records creation of an empty entity.
    pub fn create(&mut self, active: bool) -> PendingEntity {
        let pending = self.next_pending();
        self.mods.push(Mod::Create { pending, active });
        pending
    }

    /// Records duplication of `source`.
    ///
    /// If `source` no longer exists at replay, the returned id stays unbound
    /// and every mod targeting it is dropped.
    pub fn copy(&mut self, source: impl Into<ModTarget>, active: bool) -> PendingEntity {
        let pending = self.next_pending();
        self.mods.push(Mod::Copy {
            pending,
            source: source.into(),
            active,
        });
        pending
    }

    /// Records destruction of `target`.
    pub fn destroy(&mut self, target: impl Into<ModTarget>) {
        self.mods.push(Mod::Destroy(target.into()));
    }

    /// Records setting `value` on `target`, adding the component if absent.
    ///
    /// The value is captured by copy now; later changes to the original do
    /// not affect the queue.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn set_component<T: Component>(&mut self, target: impl Into<ModTarget>, value: T) {
        let component = self.catalog.id_of::<T>();
        self.mods.push(Mod::SetComponent {
            target: target.into(),
            component,
            payload: bytemuck::bytes_of(&value).into(),
        });
    }

    /// Records setting raw component bytes on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::PayloadSize`] if `bytes` is not exactly the
    /// registered size of `component`.
    ///
    /// # Panics
    ///
    /// Panics if `component` is not registered.
    #[track_caller]
    pub fn try_set_component_bytes(
        &mut self,
        target: impl Into<ModTarget>,
        component: ComponentTypeId,
        bytes: &[u8],
    ) -> EcsResult<()> {
        let ty = self.catalog.component_type(component);
        if bytes.len() != ty.size {
            return Err(EcsError::PayloadSize {
                name: ty.name,
                expected: ty.size,
                actual: bytes.len(),
            });
        }
        self.mods.push(Mod::SetComponent {
            target: target.into(),
            component,
            payload: bytes.into(),
        });
        Ok(())
    }

    /// Records setting raw component bytes on `target`.
    ///
    /// # Panics
    ///
    /// Panics if `component` is not registered or `bytes` has the wrong length.
    #[track_caller]
    pub fn set_component_bytes(
        &mut self,
        target: impl Into<ModTarget>,
        component: ComponentTypeId,
        bytes: &[u8],
    ) {
        self.try_set_component_bytes(target, component, bytes).or_panic();
    }

    /// Records removal of `T` from `target`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn remove_component<T: Component>(&mut self, target: impl Into<ModTarget>) {
        let component = self.catalog.id_of::<T>();
        self.remove_component_by_id(target, component);
    }

    /// Records removal of component type `component` from `target`.
    pub fn remove_component_by_id(&mut self, target: impl Into<ModTarget>, component: ComponentTypeId) {
        self.mods.push(Mod::RemoveComponent {
            target: target.into(),
            component,
        });
    }

    /// Replays every recorded mod against `world`, in append order.
    ///
    /// Afterwards the queue is empty and logical ids restart at zero. The
    /// mod buffer keeps its capacity.
    pub fn apply(&mut self, world: &mut World) -> ModStats {
        let mut mods = std::mem::take(&mut self.mods);
        self.resolved.clear();
        self.resolved.resize(self.pending_count(), None);

        let mut stats = ModStats::default();
        for m in mods.drain(..) {
            if self.replay(world, m) {
                stats.applied += 1;
            } else {
                stats.dropped += 1;
            }
        }

        self.mods = mods;
        self.next_pending = 0;

        tracing::trace!(applied = stats.applied, dropped = stats.dropped, "applied mod queue");
        stats
    }

    /// Applies one mod. Returns false if it was dropped.
    fn replay(&mut self, world: &mut World, m: Mod) -> bool {
        match m {
            Mod::Create { pending, active } => {
                let entity = world.create(active);
                self.bind(pending, entity);
                true
            }
            Mod::Copy { pending, source, active } => {
                let Some(source) = self.resolve_valid(world, source) else {
                    return false;
                };
                let entity = world.copy(source, active);
                self.bind(pending, entity);
                true
            }
            Mod::Destroy(target) => match self.resolve_valid(world, target) {
                Some(entity) => {
                    world.destroy(entity);
                    true
                }
                None => false,
            },
            Mod::SetComponent {
                target,
                component,
                payload,
            } => match self.resolve_valid(world, target) {
                Some(entity) => world
                    .try_set_component_bytes(entity, component, &payload)
                    .is_ok(),
                None => false,
            },
            Mod::RemoveComponent { target, component } => {
                match self.resolve_valid(world, target) {
                    Some(entity) => {
                        world.remove_component_by_id(entity, component);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Maps a target to a live entity, if it has one.
    fn resolve_valid(&self, world: &World, target: ModTarget) -> Option<Entity> {
        let entity = match target {
            ModTarget::Existing(entity) => entity,
            ModTarget::Pending(pending) => self.resolved.get(pending.index()).copied().flatten()?,
        };
        world.is_valid(entity).then_some(entity)
    }

    fn bind(&mut self, pending: PendingEntity, entity: Entity) {
        if let Some(slot) = self.resolved.get_mut(pending.index()) {
            *slot = Some(entity);
        }
    }

    fn next_pending(&mut self) -> PendingEntity {
        let pending = PendingEntity(self.next_pending);
        self.next_pending += 1;
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Health(u32);

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Armor(u16);

    fn world() -> World {
        let mut world = World::new();
        world.register_component::<Health>();
        world.register_component::<Armor>();
        world
    }

    #[test]
    fn test_pending_ids_restart() {
        let world = world();
        let mut mods = ModQueue::for_world(&world);
        assert_eq!(mods.create(true).index(), 0);
        assert_eq!(mods.create(false).index(), 1);
        mods.clear();
        assert_eq!(mods.create(true).index(), 0);
    }

    #[test]
    fn test_create_then_set_on_pending() {
        let mut world = world();
        let mut mods = ModQueue::for_world(&world);

        let pending = mods.create(true);
        mods.set_component(pending, Health(30));
        assert_eq!(world.entity_count(), 0);

        let stats = mods.apply(&mut world);
        assert_eq!(stats, ModStats { applied: 2, dropped: 0 });
        assert!(mods.is_empty());
        assert_eq!(mods.pending_count(), 0);

        let created = world.entities().record_at(0).entity();
        assert!(world.is_active(created));
        assert_eq!(world.get_component::<Health>(created), Some(&Health(30)));
    }

    #[test]
    fn test_create_set_destroy_is_noop() {
        let mut world = world();
        let mut mods = ModQueue::for_world(&world);

        let pending = mods.create(true);
        mods.set_component(pending, Health(1));
        mods.destroy(pending);
        mods.apply(&mut world);

        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.components().pool::<Health>().live_count(), 0);
    }

    #[test]
    fn test_mods_after_destroy_are_dropped() {
        let mut world = world();
        let e = world.create(true);
        let mut mods = ModQueue::for_world(&world);

        mods.destroy(e);
        mods.set_component(e, Health(5));
        mods.remove_component::<Armor>(e);
        mods.destroy(e);

        let stats = mods.apply(&mut world);
        assert_eq!(stats, ModStats { applied: 1, dropped: 3 });
        assert!(!world.is_valid(e));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut world = world();
        let e = world.create(true);
        world.add_component(e, Health(1));

        let mut mods = ModQueue::for_world(&world);
        mods.set_component(e, Health(2));
        mods.set_component(e, Health(3));
        mods.apply(&mut world);

        assert_eq!(world.get_component::<Health>(e), Some(&Health(3)));
        assert_eq!(world.components().pool::<Health>().live_count(), 1);
    }

    #[test]
    fn test_copy_of_pending() {
        let mut world = world();
        let mut mods = ModQueue::for_world(&world);

        let original = mods.create(true);
        mods.set_component(original, Armor(4));
        let copy = mods.copy(original, false);
        mods.set_component(copy, Armor(9));
        mods.apply(&mut world);

        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.active_entity_count(), 1);
        let armors: Vec<_> = world
            .entities()
            .iter()
            .map(|record| *world.get_component::<Armor>(record.entity()).unwrap())
            .collect();
        assert_eq!(armors, vec![Armor(4), Armor(9)]);
    }

    #[test]
    fn test_copy_of_destroyed_leaves_pending_unbound() {
        let mut world = world();
        let e = world.create(true);
        let mut mods = ModQueue::for_world(&world);

        mods.destroy(e);
        let copy = mods.copy(e, true);
        mods.set_component(copy, Health(1));

        let stats = mods.apply(&mut world);
        assert_eq!(stats, ModStats { applied: 1, dropped: 2 });
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_stale_pending_from_previous_batch() {
        let mut world = world();
        let mut mods = ModQueue::for_world(&world);
        let stale = mods.create(true);
        mods.apply(&mut world);

        mods.set_component(stale, Health(1));
        let stats = mods.apply(&mut world);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_byte_payload_size_checked() {
        let world = world();
        let hp = world.component_id::<Health>().unwrap();
        let mut mods = ModQueue::for_world(&world);

        let err = mods
            .try_set_component_bytes(Entity::from_raw(0), hp, &[0; 3])
            .unwrap_err();
        assert!(matches!(err, EcsError::PayloadSize { expected: 4, actual: 3, .. }));
        assert!(mods.is_empty());

        mods.set_component_bytes(Entity::from_raw(0), hp, &[0; 4]);
        assert_eq!(mods.len(), 1);
    }

    #[test]
    fn test_value_captured_at_record_time() {
        let mut world = world();
        let e = world.create(true);
        let mut mods = ModQueue::for_world(&world);

        let mut value = Health(10);
        mods.set_component(e, value);
        value.0 = 99;
        mods.apply(&mut world);

        assert_eq!(value, Health(99));
        assert_eq!(world.get_component::<Health>(e), Some(&Health(10)));
    }
}
