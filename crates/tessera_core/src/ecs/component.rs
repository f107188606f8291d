//! # Component Types
//!
//! Components are pure data containers with no behavior.
//! They must be `Pod` so the runtime can store, copy and replay them as bytes.

use std::fmt;

use bytemuck::Pod;

/// Maximum number of component types per world.
///
/// This is the width of [`ComponentMask`].
pub const MAX_COMPONENTS: usize = 128;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Pod`: Plain old data, bitwise copyable, no destructor
/// - `Send + Sync`: The world may be handed to another thread between frames
///
/// Every such type is a component; it still has to be registered with a
/// world before use.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let id = world.register_component::<Position>();
/// ```
pub trait Component: Pod + Send + Sync + 'static {}

impl<T: Pod + Send + Sync + 'static> Component for T {}

/// Dense identifier of a registered component type.
///
/// Assigned in registration order starting at zero; never changes for the
/// lifetime of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    /// Creates an id from its dense index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MAX_COMPONENTS`].
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        assert!((index as usize) < MAX_COMPONENTS, "Component id out of range");
        Self(index)
    }

    /// Returns the dense index of this id.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Registry entry describing one component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentType {
    /// Dense id.
    pub id: ComponentTypeId,
    /// Rust type name, for diagnostics.
    pub name: &'static str,
    /// Size of one component in bytes.
    pub size: usize,
    /// Alignment of the component type.
    pub align: usize,
}

impl ComponentType {
    /// Describes `T` under the given id.
    #[must_use]
    pub fn of<T: Component>(id: ComponentTypeId) -> Self {
        Self {
            id,
            name: std::any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }
}

/// Fixed-width set of component ids.
///
/// Used both as an entity's owned set and as a system's required set.
/// A match is a plain superset test: `(owned & required) == required`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u128);

impl ComponentMask {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns the empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Returns a copy of this set with `id` added.
    #[inline]
    #[must_use]
    pub const fn with(self, id: ComponentTypeId) -> Self {
        Self(self.0 | (1 << id.0))
    }

    /// Adds `id` to the set.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.0;
    }

    /// Removes `id` from the set.
    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.0);
    }

    /// Adds or removes `id` depending on `present`.
    #[inline]
    pub fn set(&mut self, id: ComponentTypeId, present: bool) {
        if present {
            self.insert(id);
        } else {
            self.remove(id);
        }
    }

    /// Checks if `id` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentTypeId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    /// Checks if every id of `other` is in this set.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if no id is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of ids in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the ids in ascending order.
    ///
    /// Uses `trailing_zeros` to skip clear bits.
    #[inline]
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let bit = bits.trailing_zeros();
            bits &= bits - 1;
            Some(ComponentTypeId(bit))
        })
    }
}

impl FromIterator<ComponentTypeId> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> ComponentTypeId {
        ComponentTypeId::new(index)
    }

    #[test]
    fn test_mask_insert_remove() {
        let mut mask = ComponentMask::new();
        assert!(!mask.contains(id(5)));

        mask.insert(id(5));
        mask.insert(id(127));
        assert!(mask.contains(id(5)));
        assert!(mask.contains(id(127)));
        assert_eq!(mask.len(), 2);

        mask.remove(id(5));
        assert!(!mask.contains(id(5)));
        assert_eq!(mask.len(), 1);
    }

    #[test]
    fn test_mask_superset() {
        let a = ComponentMask::new().with(id(0));
        let ab = a.with(id(1));
        let b = ComponentMask::new().with(id(1));

        assert!(ab.contains_all(ab));
        assert!(ab.contains_all(a));
        assert!(!a.contains_all(ab));
        assert!(!b.contains_all(ab));
        assert!(a.contains_all(ComponentMask::EMPTY));
    }

    #[test]
    fn test_mask_iter() {
        let mask: ComponentMask = [id(64), id(3), id(0)].into_iter().collect();
        let ids: Vec<_> = mask.iter().map(ComponentTypeId::index).collect();
        assert_eq!(ids, vec![0, 3, 64]);
    }

    #[test]
    fn test_component_type_layout() {
        let ty = ComponentType::of::<[f32; 3]>(id(2));
        assert_eq!(ty.size, 12);
        assert_eq!(ty.align, 4);
        assert_eq!(ty.id.to_string(), "c2");
    }
}
