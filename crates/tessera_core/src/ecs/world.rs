//! # ECS World
//!
//! The central container for all entities, components and singletons.
//!
//! Structural changes made here take effect immediately. Systems running
//! under a [`Dispatcher`](crate::Dispatcher) cannot reach these methods and
//! go through a [`ModQueue`](crate::ModQueue) instead.

use super::component::{Component, ComponentMask, ComponentTypeId};
use super::entity::{Entity, EntityRecord};
use super::singleton::{Singleton, SingletonRegistry, SingletonTypeId};
use super::storage::ComponentRegistry;
use super::table::EntityTable;
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult, OrPanic};

/// The ECS World - container for all simulation state.
///
/// Every component type gets its own chunked pool; each entity row maps
/// component types to slots in those pools. Worlds share nothing, so any
/// number of them can coexist.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
/// world.register_component::<Position>();
///
/// let entity = world.create(true);
/// world.add_component(entity, Position { x: 1.0, y: 2.0 });
/// assert!(world.has_component::<Position>(entity));
/// ```
#[derive(Debug)]
pub struct World {
    /// Component types and their pools.
    components: ComponentRegistry,
    /// Entity rows.
    entities: EntityTable,
    /// World-wide resources.
    singletons: SingletonRegistry,
}

impl World {
    /// Creates an empty world with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Creates an empty world.
    ///
    /// # Panics
    ///
    /// Panics if `config.pool_chunk_len` is zero.
    #[must_use]
    pub fn with_config(config: &WorldConfig) -> Self {
        Self {
            components: ComponentRegistry::new(config.pool_chunk_len),
            entities: EntityTable::with_capacity(config.entity_capacity),
            singletons: SingletonRegistry::new(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers component type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is already registered or the type limit is reached.
    #[track_caller]
    pub fn register_component<T: Component>(&mut self) -> ComponentTypeId {
        self.components.register::<T>()
    }

    /// Registers component type `T`.
    ///
    /// # Errors
    ///
    /// See [`ComponentRegistry::try_register`].
    pub fn try_register_component<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        self.components.try_register::<T>()
    }

    /// Returns the id of component type `T`, if registered.
    #[inline]
    #[must_use]
    pub fn component_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.components.get_id::<T>()
    }

    /// Registers singleton type `T`, initialized with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is already registered or the type limit is reached.
    #[track_caller]
    pub fn register_singleton<T: Singleton>(&mut self) -> SingletonTypeId {
        self.singletons.register::<T>()
    }

    /// Returns the id of singleton type `T`, if registered.
    #[inline]
    #[must_use]
    pub fn singleton_id<T: Singleton>(&self) -> Option<SingletonTypeId> {
        self.singletons.get_id::<T>()
    }

    /// Returns singleton `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[must_use]
    #[track_caller]
    pub fn singleton<T: Singleton>(&self) -> &T {
        self.singletons.get::<T>()
    }

    /// Returns singleton `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn singleton_mut<T: Singleton>(&mut self) -> &mut T {
        self.singletons.get_mut::<T>()
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates an entity with no components.
    pub fn create(&mut self, active: bool) -> Entity {
        self.entities.create(active)
    }

    /// Duplicates `entity` and all of its components.
    ///
    /// The copy owns fresh slots; mutating one entity never affects the other.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `entity` is not valid.
    pub fn try_copy(&mut self, entity: Entity, active: bool) -> EcsResult<Entity> {
        let source = self
            .entities
            .record(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;

        let components = &mut self.components;
        let slots: Vec<_> = source
            .components()
            .map(|(id, slot)| (id, components.storage_mut(id).create_from_copy(slot)))
            .collect();

        Ok(self.entities.create_with(active, slots))
    }

    /// Duplicates `entity` and all of its components.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[track_caller]
    pub fn copy(&mut self, entity: Entity, active: bool) -> Entity {
        self.try_copy(entity, active).or_panic()
    }

    /// Destroys `entity` and every component it owns.
    ///
    /// The last row of the table moves into the freed row.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `entity` is not valid.
    pub fn try_destroy(&mut self, entity: Entity) -> EcsResult<()> {
        let record = self
            .entities
            .remove(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;
        self.release_components(&record);
        Ok(())
    }

    /// Destroys `entity` and every component it owns.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[track_caller]
    pub fn destroy(&mut self, entity: Entity) {
        self.try_destroy(entity).or_panic();
    }

    /// Checks if `entity` exists in this world.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Returns whether `entity` is active.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `entity` is not valid.
    #[inline]
    pub fn try_is_active(&self, entity: Entity) -> EcsResult<bool> {
        self.entities
            .is_active(entity)
            .ok_or(EcsError::UnknownEntity(entity))
    }

    /// Returns whether `entity` is active.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.try_is_active(entity).or_panic()
    }

    /// Moves `entity` into or out of the active partition.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `entity` is not valid.
    pub fn try_set_active(&mut self, entity: Entity, active: bool) -> EcsResult<()> {
        self.entities
            .set_active(entity, active)
            .ok_or(EcsError::UnknownEntity(entity))
    }

    /// Moves `entity` into or out of the active partition.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[track_caller]
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        self.try_set_active(entity, active).or_panic();
    }

    /// Returns the number of entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the number of active entities.
    #[inline]
    #[must_use]
    pub fn active_entity_count(&self) -> usize {
        self.entities.active_len()
    }

    // =========================================================================
    // Typed component access
    // =========================================================================

    /// Attaches `value` to `entity` and returns it in place.
    ///
    /// If `entity` already owns a `T`, the old slot is released and replaced.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` is not valid.
    #[track_caller]
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        let id = self.components.id_of::<T>();
        let slot = self.attach(entity, id, bytemuck::bytes_of(&value)).or_panic();
        self.components.storage_mut(id).get_mut::<T>(slot)
    }

    /// Detaches `T` from `entity`. No-op if absent.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or `entity` is not valid.
    #[track_caller]
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        let id = self.components.id_of::<T>();
        self.remove_component_by_id(entity, id);
    }

    /// Checks if `entity` owns a `T`.
    ///
    /// Returns false for entities that are not valid, so a destroyed entity
    /// reads as owning nothing.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        let id = self.components.id_of::<T>();
        self.has_component_id(entity, id)
    }

    /// Returns the `T` of `entity`, if present.
    ///
    /// Returns `None` for entities that are not valid.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[must_use]
    #[track_caller]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let id = self.components.id_of::<T>();
        let slot = self.entities.record(entity)?.slot(id)?;
        Some(self.components.storage(id).get::<T>(slot))
    }

    /// Returns the `T` of `entity` mutably, if present.
    ///
    /// Returns `None` for entities that are not valid.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.components.id_of::<T>();
        let slot = self.entities.record(entity)?.slot(id)?;
        Some(self.components.storage_mut(id).get_mut::<T>(slot))
    }

    /// Visits every active entity owning a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn for_each<T: Component>(&mut self, mut f: impl FnMut(Entity, &mut T)) {
        let id = self.components.id_of::<T>();
        let pool = self.components.storage_mut(id);
        for record in self.entities.active() {
            if let Some(slot) = record.slot(id) {
                f(record.entity(), pool.get_mut::<T>(slot));
            }
        }
    }

    /// Visits every active entity owning all components in `mask`.
    ///
    /// The row handle reaches any component of the entity, not only those in
    /// `mask`.
    ///
    /// ```rust,ignore
    /// let mask = ComponentMask::EMPTY.with(pos).with(vel);
    /// world.for_each_with(mask, |mut row| {
    ///     let vel = *row.get::<Velocity>().unwrap();
    ///     row.get_mut::<Position>().unwrap().x += vel.x;
    /// });
    /// ```
    pub fn for_each_with(&mut self, mask: ComponentMask, mut f: impl FnMut(ComponentRow<'_>)) {
        for record in self.entities.active() {
            if record.has_all(mask) {
                f(ComponentRow {
                    record,
                    components: &mut self.components,
                });
            }
        }
    }

    // =========================================================================
    // Byte-level component access
    // =========================================================================

    /// Attaches a zero-filled component of type `id` and returns its bytes.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered or `entity` is not valid.
    #[track_caller]
    pub fn add_component_zeroed(&mut self, entity: Entity, id: ComponentTypeId) -> &mut [u8] {
        let zeroes = vec![0; self.components.component_type(id).size];
        let slot = self.attach(entity, id, &zeroes).or_panic();
        self.components.storage_mut(id).bytes_mut(slot)
    }

    /// Writes `bytes` as the component of type `id`, adding it if absent.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownEntity`] if `entity` is not valid
    /// - [`EcsError::PayloadSize`] if `bytes` is not exactly the registered size
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    #[track_caller]
    pub fn try_set_component_bytes(
        &mut self,
        entity: Entity,
        id: ComponentTypeId,
        bytes: &[u8],
    ) -> EcsResult<()> {
        let ty = self.components.component_type(id);
        if bytes.len() != ty.size {
            return Err(EcsError::PayloadSize {
                name: ty.name,
                expected: ty.size,
                actual: bytes.len(),
            });
        }

        let record = self
            .entities
            .record(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;
        match record.slot(id) {
            Some(slot) => self.components.storage_mut(id).bytes_mut(slot).copy_from_slice(bytes),
            None => {
                self.attach(entity, id, bytes)?;
            }
        }
        Ok(())
    }

    /// Writes `bytes` as the component of type `id`, adding it if absent.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered, `entity` is not valid, or `bytes`
    /// has the wrong length.
    #[track_caller]
    pub fn set_component_bytes(&mut self, entity: Entity, id: ComponentTypeId, bytes: &[u8]) {
        self.try_set_component_bytes(entity, id, bytes).or_panic();
    }

    /// Detaches component type `id` from `entity`. No-op if absent.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[track_caller]
    pub fn remove_component_by_id(&mut self, entity: Entity, id: ComponentTypeId) {
        let record = self
            .entities
            .record_mut(entity)
            .ok_or(EcsError::UnknownEntity(entity))
            .or_panic();
        if let Some(slot) = record.clear_slot(id) {
            self.components.storage_mut(id).destroy(slot);
        }
    }

    /// Checks if `entity` owns component type `id`.
    ///
    /// Returns false for entities that are not valid.
    #[inline]
    #[must_use]
    pub fn has_component_id(&self, entity: Entity, id: ComponentTypeId) -> bool {
        self.entities
            .record(entity)
            .is_some_and(|record| record.has(id))
    }

    /// Returns the bytes of component type `id` on `entity`, if present.
    ///
    /// Returns `None` for entities that are not valid.
    #[must_use]
    pub fn component_bytes(&self, entity: Entity, id: ComponentTypeId) -> Option<&[u8]> {
        let slot = self.entities.record(entity)?.slot(id)?;
        Some(self.components.storage(id).bytes(slot))
    }

    /// Returns the mutable bytes of component type `id` on `entity`, if present.
    ///
    /// Returns `None` for entities that are not valid.
    pub fn component_bytes_mut(&mut self, entity: Entity, id: ComponentTypeId) -> Option<&mut [u8]> {
        let slot = self.entities.record(entity)?.slot(id)?;
        Some(self.components.storage_mut(id).bytes_mut(slot))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Returns the component registry.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns the entity table.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Returns the singleton registry.
    #[inline]
    #[must_use]
    pub fn singletons(&self) -> &SingletonRegistry {
        &self.singletons
    }

    /// Returns the singleton registry mutably.
    #[inline]
    pub(crate) fn singletons_mut(&mut self) -> &mut SingletonRegistry {
        &mut self.singletons
    }

    /// Returns the bytes of component type `id` on the entity at `row`.
    #[inline]
    pub(crate) fn row_bytes(&self, row: usize, id: ComponentTypeId) -> Option<&[u8]> {
        let slot = self.entities.record_at(row).slot(id)?;
        Some(self.components.storage(id).bytes(slot))
    }

    /// Returns the mutable bytes of component type `id` on the entity at `row`.
    #[inline]
    pub(crate) fn row_bytes_mut(&mut self, row: usize, id: ComponentTypeId) -> Option<&mut [u8]> {
        let slot = self.entities.record_at(row).slot(id)?;
        Some(self.components.storage_mut(id).bytes_mut(slot))
    }

    /// Stores `bytes` in a new slot and records it on `entity`.
    ///
    /// A slot previously recorded for `id` is released.
    fn attach(&mut self, entity: Entity, id: ComponentTypeId, bytes: &[u8]) -> EcsResult<u32> {
        let record = self
            .entities
            .record_mut(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;
        let pool = self.components.storage_mut(id);
        let slot = pool.create_from_bytes(bytes);
        if let Some(previous) = record.set_slot(id, slot) {
            pool.destroy(previous);
        }
        Ok(slot)
    }

    /// Returns every slot of `record` to its pool.
    fn release_components(&mut self, record: &EntityRecord) {
        for (id, slot) in record.components() {
            self.components.storage_mut(id).destroy(slot);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// One entity row visited by [`World::for_each_with`].
pub struct ComponentRow<'a> {
    record: &'a EntityRecord,
    components: &'a mut ComponentRegistry,
}

impl ComponentRow<'_> {
    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.record.entity()
    }

    /// Returns the components the entity owns.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.record.mask()
    }

    /// Returns the entity's `T`, if present.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[must_use]
    #[track_caller]
    pub fn get<T: Component>(&self) -> Option<&T> {
        let id = self.components.id_of::<T>();
        let slot = self.record.slot(id)?;
        Some(self.components.storage(id).get::<T>(slot))
    }

    /// Returns the entity's `T` mutably, if present.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let id = self.components.id_of::<T>();
        let slot = self.record.slot(id)?;
        Some(self.components.storage_mut(id).get_mut::<T>(slot))
    }

    /// Returns the bytes of component type `id`, if present.
    #[must_use]
    pub fn bytes(&self, id: ComponentTypeId) -> Option<&[u8]> {
        let slot = self.record.slot(id)?;
        Some(self.components.storage(id).bytes(slot))
    }

    /// Returns the mutable bytes of component type `id`, if present.
    pub fn bytes_mut(&mut self, id: ComponentTypeId) -> Option<&mut [u8]> {
        let slot = self.record.slot(id)?;
        Some(self.components.storage_mut(id).bytes_mut(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Health(u32);

    fn world() -> World {
        let mut world = World::with_config(&WorldConfig::compact());
        world.register_component::<Position>();
        world.register_component::<Health>();
        world
    }

    #[test]
    fn test_create_and_destroy() {
        let mut world = world();
        let a = world.create(true);
        let b = world.create(false);

        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.active_entity_count(), 1);
        assert!(world.is_active(a));
        assert!(!world.is_active(b));

        world.destroy(a);
        assert!(!world.is_valid(a));
        assert!(world.is_valid(b));
        assert_eq!(world.active_entity_count(), 0);
        assert!(matches!(world.try_destroy(a), Err(EcsError::UnknownEntity(_))));
    }

    #[test]
    fn test_component_crud() {
        let mut world = world();
        let e = world.create(true);

        world.add_component(e, Position { x: 1.0, y: 2.0 }).x += 1.0;
        assert_eq!(world.get_component::<Position>(e), Some(&Position { x: 2.0, y: 2.0 }));
        assert!(world.has_component::<Position>(e));
        assert!(!world.has_component::<Health>(e));

        world.get_component_mut::<Position>(e).unwrap().y = 9.0;
        assert_eq!(world.get_component::<Position>(e).unwrap().y, 9.0);

        world.remove_component::<Position>(e);
        assert!(world.get_component::<Position>(e).is_none());
        // Removing again is a no-op.
        world.remove_component::<Position>(e);
    }

    #[test]
    fn test_add_twice_releases_old_slot() {
        let mut world = world();
        let e = world.create(true);
        world.add_component(e, Health(1));
        world.add_component(e, Health(2));

        assert_eq!(world.get_component::<Health>(e), Some(&Health(2)));
        assert_eq!(world.components().pool::<Health>().live_count(), 1);
    }

    #[test]
    fn test_destroy_releases_components() {
        let mut world = world();
        let e = world.create(true);
        world.add_component(e, Position::default());
        world.add_component(e, Health(5));
        world.destroy(e);

        assert_eq!(world.components().pool::<Position>().live_count(), 0);
        assert_eq!(world.components().pool::<Health>().live_count(), 0);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut world = world();
        let original = world.create(true);
        world.add_component(original, Health(10));

        let copy = world.copy(original, false);
        assert!(!world.is_active(copy));
        world.get_component_mut::<Health>(copy).unwrap().0 = 99;

        assert_eq!(world.get_component::<Health>(original), Some(&Health(10)));
        assert_eq!(world.get_component::<Health>(copy), Some(&Health(99)));
    }

    #[test]
    fn test_swap_destroy_keeps_other_data() {
        let mut world = world();
        let entities: Vec<_> = (0..4u32)
            .map(|i| {
                let e = world.create(true);
                world.add_component(e, Health(i));
                e
            })
            .collect();

        world.destroy(entities[0]);
        for (i, &e) in entities.iter().enumerate().skip(1) {
            #[allow(clippy::cast_possible_truncation)]
            let expected = Health(i as u32);
            assert_eq!(world.get_component::<Health>(e), Some(&expected));
            assert!(world.is_active(e));
        }
    }

    #[test]
    fn test_byte_level_access() {
        let mut world = world();
        let hp = world.component_id::<Health>().unwrap();
        let e = world.create(true);

        assert_eq!(world.add_component_zeroed(e, hp), &[0, 0, 0, 0]);
        world.set_component_bytes(e, hp, &7u32.to_ne_bytes());
        assert_eq!(world.get_component::<Health>(e), Some(&Health(7)));
        assert!(world.has_component_id(e, hp));

        let err = world.try_set_component_bytes(e, hp, &[1, 2]).unwrap_err();
        assert!(matches!(err, EcsError::PayloadSize { expected: 4, actual: 2, .. }));

        world.component_bytes_mut(e, hp).unwrap().fill(0xFF);
        assert_eq!(world.get_component::<Health>(e), Some(&Health(u32::MAX)));
        assert_eq!(world.component_bytes(e, hp), Some(&[0xFF; 4][..]));

        world.remove_component_by_id(e, hp);
        assert!(!world.has_component_id(e, hp));
    }

    #[test]
    fn test_for_each_skips_inactive() {
        let mut world = world();
        let active = world.create(true);
        let inactive = world.create(false);
        world.add_component(active, Health(1));
        world.add_component(inactive, Health(1));

        world.for_each::<Health>(|_, hp| hp.0 += 1);
        assert_eq!(world.get_component::<Health>(active), Some(&Health(2)));
        assert_eq!(world.get_component::<Health>(inactive), Some(&Health(1)));
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_for_each_with_mask() {
        let mut world = world();
        let pos = world.component_id::<Position>().unwrap();
        let hp = world.component_id::<Health>().unwrap();

        let both = world.create(true);
        world.add_component(both, Position { x: 1.0, y: 0.0 });
        world.add_component(both, Health(3));
        let only_pos = world.create(true);
        world.add_component(only_pos, Position::default());
        let hidden = world.copy(both, false);

        let mut seen = Vec::new();
        world.for_each_with(ComponentMask::EMPTY.with(pos).with(hp), |mut row| {
            seen.push(row.entity());
            let bonus = row.get::<Health>().map_or(0.0, |h| h.0 as f32);
            row.get_mut::<Position>().unwrap().x += bonus;
            assert!(row.mask().contains(hp));
            assert_eq!(row.bytes(hp), Some(&3u32.to_ne_bytes()[..]));
        });

        assert_eq!(seen, vec![both]);
        assert_eq!(world.get_component::<Position>(both).unwrap().x, 4.0);
        assert_eq!(world.get_component::<Position>(hidden).unwrap().x, 1.0);
    }

    #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    #[allow(dead_code)]
    struct NeverRegistered(u8);

    #[test]
    #[should_panic(expected = "component type not registered")]
    fn test_get_unregistered_component_panics() {
        let mut world = world();
        let e = world.create(true);
        let _ = world.get_component::<NeverRegistered>(e);
    }

    #[test]
    #[should_panic(expected = "component type not registered")]
    fn test_get_mut_unregistered_component_panics() {
        let mut world = world();
        let e = world.create(true);
        let _ = world.get_component_mut::<NeverRegistered>(e);
    }

    #[test]
    #[should_panic(expected = "component type not registered")]
    fn test_has_unregistered_component_panics() {
        let mut world = world();
        let e = world.create(true);
        let _ = world.has_component::<NeverRegistered>(e);
    }

    #[test]
    #[should_panic(expected = "component type not registered")]
    fn test_remove_unregistered_component_panics() {
        let mut world = world();
        let e = world.create(true);
        world.remove_component::<NeverRegistered>(e);
    }

    #[test]
    #[should_panic(expected = "component type not registered")]
    fn test_for_each_unregistered_component_panics() {
        let mut world = world();
        world.for_each::<NeverRegistered>(|_, _| {});
    }

    #[test]
    fn test_destroyed_entity_reads_absent() {
        let mut world = world();
        let hp = world.component_id::<Health>().unwrap();
        let e = world.create(true);
        world.add_component(e, Health(1));
        world.destroy(e);

        assert!(!world.has_component::<Health>(e));
        assert!(world.get_component::<Health>(e).is_none());
        assert!(world.get_component_mut::<Health>(e).is_none());
        assert!(world.component_bytes(e, hp).is_none());
    }

    #[test]
    fn test_set_active_round_trip() {
        let mut world = world();
        let e = world.create(false);
        world.set_active(e, true);
        assert!(world.is_active(e));
        world.set_active(e, false);
        assert!(!world.is_active(e));
        assert!(world.try_set_active(Entity::from_raw(99), true).is_err());
    }

    #[test]
    #[should_panic(expected = "unknown entity: e42")]
    fn test_unknown_entity_panics() {
        let mut world = world();
        world.add_component(Entity::from_raw(42), Health(0));
    }

    #[test]
    fn test_singletons() {
        #[derive(Default)]
        struct Frame(u64);

        let mut world = world();
        world.register_singleton::<Frame>();
        world.singleton_mut::<Frame>().0 += 1;
        assert_eq!(world.singleton::<Frame>().0, 1);
        assert!(world.singleton_id::<Frame>().is_some());
    }
}
