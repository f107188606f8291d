//! # Entity Management
//!
//! Entities are plain 64-bit ids handed out in increasing order and never
//! reused. Each live entity owns one [`EntityRecord`] holding:
//! - A component mask (which types are attached)
//! - One pool slot per component type

use std::fmt;

use super::component::{ComponentMask, ComponentTypeId, MAX_COMPONENTS};
use crate::memory::{SlotIndex, INVALID_SLOT};

/// Unique identifier for an entity.
///
/// Ids count up from zero per world. A destroyed id is never issued again,
/// so a stale id simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Null/invalid entity id. Never issued by a world.
    pub const NULL: Self = Self(u64::MAX);

    /// Wraps a raw id.
    ///
    /// The result only refers to a live entity if the world issued that id.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Checks if this is the null id.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// One row of the entity table.
///
/// Invariant: bit `i` of `mask` is set exactly when `slots[i]` is a live slot
/// in the pool of component type `i`. Clear bits pair with [`INVALID_SLOT`].
#[derive(Clone, Debug)]
pub struct EntityRecord {
    /// The entity this row belongs to.
    entity: Entity,
    /// Attached component types.
    mask: ComponentMask,
    /// Pool slot per component type.
    slots: [SlotIndex; MAX_COMPONENTS],
}

impl EntityRecord {
    /// Creates a record with no components.
    #[inline]
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            mask: ComponentMask::EMPTY,
            slots: [INVALID_SLOT; MAX_COMPONENTS],
        }
    }

    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the set of attached component types.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Checks if component type `id` is attached.
    #[inline]
    #[must_use]
    pub const fn has(&self, id: ComponentTypeId) -> bool {
        self.mask.contains(id)
    }

    /// Checks if every type of `required` is attached.
    #[inline]
    #[must_use]
    pub const fn has_all(&self, required: ComponentMask) -> bool {
        self.mask.contains_all(required)
    }

    /// Returns the slot of component type `id`, if attached.
    #[inline]
    #[must_use]
    pub const fn slot(&self, id: ComponentTypeId) -> Option<SlotIndex> {
        if self.mask.contains(id) {
            Some(self.slots[id.index()])
        } else {
            None
        }
    }

    /// Records `slot` for component type `id` and sets the mask bit.
    ///
    /// Returns the slot previously recorded for `id`, if any.
    #[inline]
    pub fn set_slot(&mut self, id: ComponentTypeId, slot: SlotIndex) -> Option<SlotIndex> {
        let previous = self.slot(id);
        self.slots[id.index()] = slot;
        self.mask.insert(id);
        previous
    }

    /// Clears component type `id` and returns its slot, if it was attached.
    #[inline]
    pub fn clear_slot(&mut self, id: ComponentTypeId) -> Option<SlotIndex> {
        let previous = self.slot(id);
        self.slots[id.index()] = INVALID_SLOT;
        self.mask.remove(id);
        previous
    }

    /// Iterates over `(type, slot)` for every attached component.
    pub fn components(&self) -> impl Iterator<Item = (ComponentTypeId, SlotIndex)> + '_ {
        self.mask.iter().map(|id| (id, self.slots[id.index()]))
    }
}
