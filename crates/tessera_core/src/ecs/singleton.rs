//! # Singletons
//!
//! World-wide resources: exactly one value per registered type, created from
//! `Default` at registration.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::{EcsError, EcsResult, OrPanic};

/// Maximum number of singleton types per world.
pub const MAX_SINGLETONS: usize = 32;

/// Marker trait for singleton resources.
pub trait Singleton: Default + Send + Sync + 'static {}

impl<T: Default + Send + Sync + 'static> Singleton for T {}

/// Dense identifier of a registered singleton type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SingletonTypeId(u32);

impl SingletonTypeId {
    /// Returns the dense index of this id.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the single bit this id occupies in an access mask.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for SingletonTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One stored singleton.
struct Entry {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Registry owning one value per singleton type.
#[derive(Default)]
pub struct SingletonRegistry {
    /// Type lookup.
    ids: HashMap<TypeId, SingletonTypeId>,
    /// Values indexed by id.
    entries: Vec<Entry>,
}

impl SingletonRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and stores `T::default()`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateSingleton`] if `T` is already registered
    /// - [`EcsError::SingletonLimit`] if [`MAX_SINGLETONS`] types exist
    pub fn try_register<T: Singleton>(&mut self) -> EcsResult<SingletonTypeId> {
        let name = std::any::type_name::<T>();
        if self.ids.contains_key(&TypeId::of::<T>()) {
            return Err(EcsError::DuplicateSingleton { name });
        }
        if self.entries.len() >= MAX_SINGLETONS {
            return Err(EcsError::SingletonLimit { max: MAX_SINGLETONS });
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = SingletonTypeId(self.entries.len() as u32);
        self.ids.insert(TypeId::of::<T>(), id);
        self.entries.push(Entry {
            name,
            value: Box::new(T::default()),
        });

        tracing::debug!(singleton = name, id = id.index(), "registered singleton");
        Ok(id)
    }

    /// Registers `T` and stores `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is already registered or the type limit is reached.
    #[track_caller]
    pub fn register<T: Singleton>(&mut self) -> SingletonTypeId {
        self.try_register::<T>().or_panic()
    }

    /// Returns the id of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn get_id<T: Singleton>(&self) -> Option<SingletonTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the id of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSingleton`] if `T` was never registered.
    #[inline]
    pub fn try_id_of<T: Singleton>(&self) -> EcsResult<SingletonTypeId> {
        self.get_id::<T>().ok_or(EcsError::UnknownSingleton {
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
    pub fn id_of<T: Singleton>(&self) -> SingletonTypeId {
        self.try_id_of::<T>().or_panic()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    #[track_caller]
    pub fn name(&self, id: SingletonTypeId) -> &'static str {
        self.entries[id.index()].name
    }

    /// Returns the number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[must_use]
    #[track_caller]
    pub fn get<T: Singleton>(&self) -> &T {
        let id = self.id_of::<T>();
        self.entries[id.index()]
            .value
            .downcast_ref::<T>()
            .ok_or(EcsError::UnknownSingleton {
                name: std::any::type_name::<T>(),
            })
            .or_panic()
    }

    /// Returns the mutable value of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn get_mut<T: Singleton>(&mut self) -> &mut T {
        let id = self.id_of::<T>();
        self.entries[id.index()]
            .value
            .downcast_mut::<T>()
            .ok_or(EcsError::UnknownSingleton {
                name: std::any::type_name::<T>(),
            })
            .or_panic()
    }
}

impl fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Clock {
        ticks: u64,
    }

    #[derive(Default)]
    struct Gravity;

    #[test]
    fn test_singleton_default_value() {
        let mut registry = SingletonRegistry::new();
        let clock = registry.register::<Clock>();
        let gravity = registry.register::<Gravity>();

        assert_eq!(clock.index(), 0);
        assert_eq!(gravity.bit(), 0b10);
        assert_eq!(registry.get::<Clock>(), &Clock::default());
    }

    #[test]
    fn test_singleton_mutation() {
        let mut registry = SingletonRegistry::new();
        registry.register::<Clock>();
        registry.get_mut::<Clock>().ticks += 3;
        assert_eq!(registry.get::<Clock>().ticks, 3);
    }

    #[test]
    fn test_singleton_duplicate() {
        let mut registry = SingletonRegistry::new();
        registry.register::<Gravity>();
        assert!(matches!(
            registry.try_register::<Gravity>(),
            Err(EcsError::DuplicateSingleton { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "singleton type not registered")]
    fn test_singleton_unknown() {
        let registry = SingletonRegistry::new();
        let _ = registry.get::<Clock>();
    }
}
