//! # System Context
//!
//! The view a system gets during its update: the entities matching its
//! required components (collected once, before the pass starts) and
//! access-checked handles to their data.
//!
//! The context borrows the world mutably but exposes no structural
//! operations. Creating, destroying or reshaping entities goes through the
//! [`ModQueue`](super::ModQueue).

use super::system::{Access, SystemType};
use crate::ecs::{Component, ComponentTypeId, Entity, Singleton, World};
use crate::error::OrPanic;

/// Per-pass view handed to [`System::update`](super::System::update).
pub struct SystemContext<'w> {
    world: &'w mut World,
    kind: &'w SystemType,
    rows: &'w [usize],
}

impl<'w> SystemContext<'w> {
    /// Builds a context over the given matched rows.
    pub(crate) fn new(world: &'w mut World, kind: &'w SystemType, rows: &'w [usize]) -> Self {
        Self { world, kind, rows }
    }

    /// Returns the number of matched entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no entity matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the running system's descriptor.
    #[inline]
    #[must_use]
    pub fn system_type(&self) -> &SystemType {
        self.kind
    }

    /// Iterates over the ids of the matched entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        let table = self.world.entities();
        self.rows.iter().map(move |&row| table.record_at(row).entity())
    }

    /// Returns a handle to the `index`-th matched entity.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[track_caller]
    pub fn entity(&mut self, index: usize) -> SystemEntity<'_> {
        let row = self.rows[index];
        SystemEntity::new(self.world, self.kind, row)
    }

    /// Calls `f` with a handle to every matched entity, in row order.
    pub fn for_each(&mut self, mut f: impl FnMut(SystemEntity<'_>)) {
        let rows = self.rows;
        for &row in rows {
            f(SystemEntity::new(self.world, self.kind, row));
        }
    }

    /// Returns a handle to any valid entity, matched or not.
    ///
    /// The same access rules apply. Returns `None` if `entity` is not valid.
    pub fn get(&mut self, entity: Entity) -> Option<SystemEntity<'_>> {
        let row = self.world.entities().row_of(entity)?;
        Some(SystemEntity::new(self.world, self.kind, row))
    }

    /// Returns singleton `T` for reading.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or the system did not declare it.
    #[must_use]
    #[track_caller]
    pub fn read_singleton<T: Singleton>(&self) -> &T {
        let singletons = self.world.singletons();
        let id = singletons.id_of::<T>();
        self.kind
            .check_singleton_access(id, Access::Read, std::any::type_name::<T>())
            .or_panic();
        singletons.get::<T>()
    }

    /// Returns singleton `T` for writing.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or the system did not declare write
    /// access to it.
    #[track_caller]
    pub fn write_singleton<T: Singleton>(&mut self) -> &mut T {
        let id = self.world.singletons().id_of::<T>();
        self.kind
            .check_singleton_access(id, Access::Write, std::any::type_name::<T>())
            .or_panic();
        self.world.singletons_mut().get_mut::<T>()
    }
}

/// Access-checked handle to one entity during a system pass.
pub struct SystemEntity<'a> {
    world: &'a mut World,
    kind: &'a SystemType,
    row: usize,
}

impl<'a> SystemEntity<'a> {
    fn new(world: &'a mut World, kind: &'a SystemType, row: usize) -> Self {
        Self { world, kind, row }
    }

    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Entity {
        self.world.entities().record_at(self.row).entity()
    }

    /// Checks if the entity owns a `T`. Needs no declaration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[must_use]
    #[track_caller]
    pub fn has<T: Component>(&self) -> bool {
        let id = self.world.components().id_of::<T>();
        self.world.entities().record_at(self.row).has(id)
    }

    /// Returns the entity's `T` for reading, if present.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or the system did not declare it.
    #[must_use]
    #[track_caller]
    pub fn read<T: Component>(&self) -> Option<&T> {
        let id = self.checked_id::<T>(Access::Read);
        self.world.row_bytes(self.row, id).map(bytemuck::from_bytes)
    }

    /// Returns the entity's `T` for writing, if present.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or the system declared it read-only
    /// or not at all.
    #[track_caller]
    pub fn write<T: Component>(&mut self) -> Option<&mut T> {
        let id = self.checked_id::<T>(Access::Write);
        self.world.row_bytes_mut(self.row, id).map(bytemuck::from_bytes_mut)
    }

    #[track_caller]
    fn checked_id<T: Component>(&self, access: Access) -> ComponentTypeId {
        let id = self.world.components().id_of::<T>();
        self.kind
            .check_access(id, access, std::any::type_name::<T>())
            .or_panic();
        id
    }
}
