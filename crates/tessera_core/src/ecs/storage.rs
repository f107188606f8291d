//! # Component Storage
//!
//! The component type registry: one [`ObjectPool`] per registered type,
//! addressed by a dense [`ComponentTypeId`].
//!
//! The registry has two tiers:
//! - typed accessors (`pool::<T>()`, `id_of::<T>()`) for normal call sites
//! - id-indexed, byte-level access (`storage(id)`) for generic code such as
//!   mod-queue replay, which only knows an id and a size

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::component::{Component, ComponentType, ComponentTypeId, MAX_COMPONENTS};
use crate::error::{EcsError, EcsResult, OrPanic};
use crate::memory::{ObjectPool, DEFAULT_CHUNK_LEN, MAX_COMPONENT_ALIGN};

/// Immutable snapshot of the type → id mapping.
///
/// Shared copy-on-write between the registry and mod queues, so a queue can
/// resolve component ids while the world itself is borrowed by a system.
#[derive(Clone, Debug, Default)]
pub struct ComponentCatalog {
    /// Type lookup.
    ids: HashMap<TypeId, ComponentTypeId>,
    /// Entries indexed by id.
    types: Vec<ComponentType>,
}

impl ComponentCatalog {
    /// Returns the id of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn get_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the id of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownComponent`] if `T` was never registered.
    #[inline]
    pub fn try_id_of<T: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.get_id::<T>().ok_or(EcsError::UnknownComponent {
            name: std::any::type_name::<T>(),
        })
    }

    /// Returns the id of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn id_of<T: Component>(&self) -> ComponentTypeId {
        self.try_id_of::<T>().or_panic()
    }

    /// Returns the entry for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this catalog.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn component_type(&self, id: ComponentTypeId) -> &ComponentType {
        &self.types[id.index()]
    }

    /// Returns the entry for `id`, if registered.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ComponentTypeId) -> Option<&ComponentType> {
        self.types.get(id.index())
    }

    /// Returns the number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over all entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.iter()
    }
}

/// Registry of component types and their pools.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ComponentRegistry::new(4096);
/// let id = registry.register::<Position>();
///
/// let slot = registry.pool_mut::<Position>().create(Position::default());
/// assert_eq!(registry.storage(id).live_count(), 1);
/// ```
#[derive(Debug)]
pub struct ComponentRegistry {
    /// Type table, shared with mod queues.
    catalog: Arc<ComponentCatalog>,
    /// One pool per registered type, indexed by id.
    pools: Vec<ObjectPool>,
    /// Chunk length for new pools.
    chunk_len: usize,
}

impl ComponentRegistry {
    /// Creates an empty registry whose pools use `chunk_len` slots per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_len` is zero.
    #[must_use]
    pub fn new(chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "Chunk length must be greater than zero");
        Self {
            catalog: Arc::new(ComponentCatalog::default()),
            pools: Vec::new(),
            chunk_len,
        }
    }

    /// Registers `T` and creates its pool.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateComponent`] if `T` is already registered
    /// - [`EcsError::ComponentLimit`] if [`MAX_COMPONENTS`] types exist
    /// - [`EcsError::ComponentAlignment`] if `T` is over-aligned for the pools
    pub fn try_register<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        let name = std::any::type_name::<T>();
        if self.catalog.get_id::<T>().is_some() {
            return Err(EcsError::DuplicateComponent { name });
        }
        if self.pools.len() >= MAX_COMPONENTS {
            return Err(EcsError::ComponentLimit { max: MAX_COMPONENTS });
        }
        let align = std::mem::align_of::<T>();
        if align > MAX_COMPONENT_ALIGN {
            return Err(EcsError::ComponentAlignment {
                name,
                align,
                max: MAX_COMPONENT_ALIGN,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentTypeId::new(self.pools.len() as u32);
        let ty = ComponentType::of::<T>(id);

        let catalog = Arc::make_mut(&mut self.catalog);
        catalog.ids.insert(TypeId::of::<T>(), id);
        catalog.types.push(ty);
        self.pools.push(ObjectPool::new(ty.size, self.chunk_len));

        tracing::debug!(component = name, id = id.index(), size = ty.size, "registered component");
        Ok(id)
    }

    /// Registers `T` and creates its pool.
    ///
    /// # Panics
    ///
    /// Panics if `T` is already registered, the type limit is reached, or `T`
    /// is over-aligned.
    #[track_caller]
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        self.try_register::<T>().or_panic()
    }

    /// Returns the shared type table.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.catalog
    }

    /// Returns the id of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn get_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.catalog.get_id::<T>()
    }

    /// Returns the id of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownComponent`] if `T` was never registered.
    #[inline]
    pub fn try_id_of<T: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.catalog.try_id_of::<T>()
    }

    /// Returns the id of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn id_of<T: Component>(&self) -> ComponentTypeId {
        self.catalog.id_of::<T>()
    }

    /// Returns the entry for `id`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn component_type(&self, id: ComponentTypeId) -> &ComponentType {
        self.catalog.component_type(id)
    }

    /// Returns true if `id` was issued by this registry.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        id.index() < self.pools.len()
    }

    /// Returns the number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns true if no type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Iterates over all entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.catalog.iter()
    }

    /// Returns the type-erased pool for `id`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn storage(&self, id: ComponentTypeId) -> &ObjectPool {
        &self.pools[id.index()]
    }

    /// Returns the mutable type-erased pool for `id`.
    #[inline]
    #[track_caller]
    pub fn storage_mut(&mut self, id: ComponentTypeId) -> &mut ObjectPool {
        &mut self.pools[id.index()]
    }

    /// Returns the pool holding `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn pool<T: Component>(&self) -> &ObjectPool {
        self.storage(self.id_of::<T>())
    }

    /// Returns the mutable pool holding `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[inline]
    #[track_caller]
    pub fn pool_mut<T: Component>(&mut self) -> &mut ObjectPool {
        let id = self.id_of::<T>();
        self.storage_mut(id)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_LEN)
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

    #[test]
    fn test_registry_dense_ids() {
        let mut registry = ComponentRegistry::new(16);
        let pos = registry.register::<Position>();
        let hp = registry.register::<Health>();

        assert_eq!(pos.index(), 0);
        assert_eq!(hp.index(), 1);
        assert_eq!(registry.id_of::<Health>(), hp);
        assert_eq!(registry.component_type(pos).size, 8);
        assert_eq!(registry.storage(hp).element_size(), 4);
    }

    #[test]
    fn test_registry_duplicate() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Position>();

        let err = registry.try_register::<Position>().unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_unknown() {
        let registry = ComponentRegistry::new(16);
        assert!(registry.get_id::<Position>().is_none());
        assert!(matches!(
            registry.try_id_of::<Position>(),
            Err(EcsError::UnknownComponent { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_registry_unknown_panics() {
        let registry = ComponentRegistry::new(16);
        let _ = registry.id_of::<Health>();
    }

    #[test]
    fn test_registry_catalog_snapshot() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Position>();
        let snapshot = Arc::clone(registry.catalog());

        registry.register::<Health>();

        // The old snapshot is untouched; the registry sees both types.
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.catalog().len(), 2);
    }

    #[test]
    fn test_registry_typed_pool() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Position>();

        let slot = registry.pool_mut::<Position>().create(Position { x: 1.0, y: 2.0 });
        assert_eq!(
            *registry.pool::<Position>().get::<Position>(slot),
            Position { x: 1.0, y: 2.0 }
        );
    }
}
