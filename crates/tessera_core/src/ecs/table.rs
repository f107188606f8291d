//! # Entity Table
//!
//! Dense rows of [`EntityRecord`], partitioned into an active prefix and an
//! inactive suffix:
//!
//! ```text
//! [ active ... active | inactive ... inactive ]
//!   0                 ^ active_len            ^ len
//! ```
//!
//! Every structural change keeps the partition with at most two row swaps,
//! so iteration over active entities is a plain scan of `0..active_len`.

use std::collections::HashMap;

use super::component::{ComponentMask, ComponentTypeId};
use super::entity::{Entity, EntityRecord};
use crate::memory::SlotIndex;

/// Row storage for all entities of one world.
#[derive(Debug, Default)]
pub struct EntityTable {
    /// Rows, active prefix first.
    records: Vec<EntityRecord>,
    /// Entity id → row.
    index: HashMap<Entity, usize>,
    /// Number of active rows.
    active_len: usize,
    /// Next id to hand out.
    next_id: u64,
}

impl EntityTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            active_len: 0,
            next_id: 0,
        }
    }

    /// Returns the number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of active rows.
    #[inline]
    #[must_use]
    pub const fn active_len(&self) -> usize {
        self.active_len
    }

    /// Checks if `entity` has a row.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Returns the row of `entity`.
    #[inline]
    #[must_use]
    pub fn row_of(&self, entity: Entity) -> Option<usize> {
        self.index.get(&entity).copied()
    }

    /// Returns whether `entity` is active, or `None` if it has no row.
    #[inline]
    #[must_use]
    pub fn is_active(&self, entity: Entity) -> Option<bool> {
        self.row_of(entity).map(|row| row < self.active_len)
    }

    /// Returns the record of `entity`.
    #[inline]
    #[must_use]
    pub fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.row_of(entity).map(|row| &self.records[row])
    }

    /// Returns the mutable record of `entity`.
    #[inline]
    pub fn record_mut(&mut self, entity: Entity) -> Option<&mut EntityRecord> {
        let row = self.row_of(entity)?;
        Some(&mut self.records[row])
    }

    /// Returns the record at `row`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn record_at(&self, row: usize) -> &EntityRecord {
        &self.records[row]
    }

    /// Returns the mutable record at `row`.
    #[inline]
    #[track_caller]
    pub fn record_at_mut(&mut self, row: usize) -> &mut EntityRecord {
        &mut self.records[row]
    }

    /// Iterates over the active records.
    pub fn active(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records[..self.active_len].iter()
    }

    /// Iterates over all records, active first.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }

    /// Creates a new entity with no components.
    ///
    /// An active entity lands on the partition boundary: the first inactive
    /// row (if any) moves to the end to make room.
    pub fn create(&mut self, active: bool) -> Entity {
        self.create_with(active, std::iter::empty())
    }

    /// Creates a new entity whose row already records `components`.
    ///
    /// The slots must be live in their pools; ownership passes to the row.
    pub fn create_with(
        &mut self,
        active: bool,
        components: impl IntoIterator<Item = (ComponentTypeId, SlotIndex)>,
    ) -> Entity {
        let entity = Entity::from_raw(self.next_id);
        self.next_id += 1;

        let mut record = EntityRecord::new(entity);
        for (id, slot) in components {
            record.set_slot(id, slot);
        }

        let row = self.records.len();
        self.records.push(record);
        self.index.insert(entity, row);

        if active {
            self.swap_rows(row, self.active_len);
            self.active_len += 1;
        }
        entity
    }

    /// Moves `entity` to the requested side of the partition.
    ///
    /// Returns `None` if `entity` has no row.
    pub fn set_active(&mut self, entity: Entity, active: bool) -> Option<()> {
        let row = self.row_of(entity)?;
        if active && row >= self.active_len {
            self.swap_rows(row, self.active_len);
            self.active_len += 1;
        } else if !active && row < self.active_len {
            self.active_len -= 1;
            self.swap_rows(row, self.active_len);
        }
        Some(())
    }

    /// Removes the row of `entity` and returns its record.
    ///
    /// The row first leaves the active region, then swaps with the last row
    /// and is popped. Component slots in the record are left for the caller
    /// to release.
    pub fn remove(&mut self, entity: Entity) -> Option<EntityRecord> {
        self.set_active(entity, false)?;
        let row = self.row_of(entity)?;
        let last = self.records.len() - 1;
        self.swap_rows(row, last);

        self.index.remove(&entity);
        self.records.pop()
    }

    /// Collects the active rows whose mask contains `required`.
    ///
    /// `out` is cleared first; its capacity is kept.
    pub fn collect_matching(&self, required: ComponentMask, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            self.records[..self.active_len]
                .iter()
                .enumerate()
                .filter(|(_, record)| record.has_all(required))
                .map(|(row, _)| row),
        );
    }

    /// Swaps two rows and fixes up the index.
    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.records.swap(a, b);
        self.index.insert(self.records[a].entity(), a);
        self.index.insert(self.records[b].entity(), b);
    }
}
