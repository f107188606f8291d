//! # Object Pool
//!
//! Slot allocator layered on a [`BlockArena`], with a free list for reuse.

use bytemuck::Pod;

use super::arena::BlockArena;

/// Index of a slot inside an [`ObjectPool`].
pub type SlotIndex = u32;

/// Sentinel for "no slot".
pub const INVALID_SLOT: SlotIndex = SlotIndex::MAX;

/// A pool of fixed-size objects stored as bytes in a [`BlockArena`].
///
/// Objects are created into a free slot (or a new one at the end) and
/// destroyed back onto the free list. The pool is type-erased: typed views
/// go through `bytemuck`, so any `Pod` value whose size matches the pool's
/// element size can be read or written in place.
///
/// Two access tiers:
///
/// - [`bytes`](Self::bytes) / [`get`](Self::get): unchecked, liveness is
///   only debug-asserted
/// - [`try_bytes`](Self::try_bytes): checked, returns `None` for slots that
///   are out of range or not live
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. The world owning it is driven from one thread.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ObjectPool::new(4, 1024);
///
/// let slot = pool.create(42u32);
/// pool.destroy(slot);
///
/// // Freed slot is reused first
/// assert_eq!(pool.create(7u32), slot);
/// ```
#[derive(Debug)]
pub struct ObjectPool {
    /// Backing storage.
    arena: BlockArena,
    /// Number of slots ever handed out (high-water mark).
    len: usize,
    /// Reclaimed slots, reused last-in first-out.
    free_list: Vec<SlotIndex>,
    /// Liveness of every slot below `len`.
    live: Vec<bool>,
}

impl ObjectPool {
    /// Creates an empty pool.
    ///
    /// # Arguments
    ///
    /// * `element_size` - Size of one object in bytes
    /// * `chunk_len` - Number of objects per arena chunk
    #[must_use]
    pub fn new(element_size: usize, chunk_len: usize) -> Self {
        Self {
            arena: BlockArena::new(element_size, chunk_len),
            len: 0,
            free_list: Vec::new(),
            live: Vec::new(),
        }
    }

    /// Returns the object size in bytes.
    #[inline]
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.arena.element_size()
    }

    /// Returns the number of slots ever handed out, live or free.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot was ever handed out.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len - self.free_list.len()
    }

    /// Returns the number of slots waiting on the free list.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the number of addressable slots in the backing arena.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns true if `index` denotes a live object.
    #[inline]
    #[must_use]
    pub fn is_live(&self, index: SlotIndex) -> bool {
        self.live.get(index as usize).copied().unwrap_or(false)
    }

    /// Ensures `capacity` slots are addressable without further growth.
    pub fn reserve(&mut self, capacity: usize) {
        self.arena.reserve(capacity);
    }

    /// Stores `value` in a free slot and returns its index.
    ///
    /// This is **O(1)** amortized: a freed slot is reused before the pool grows.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` differs from the pool's element size.
    pub fn create<T: Pod>(&mut self, value: T) -> SlotIndex {
        self.create_from_bytes(bytemuck::bytes_of(&value))
    }

    /// Stores a copy of `bytes` in a free slot and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` differs from the pool's element size.
    pub fn create_from_bytes(&mut self, bytes: &[u8]) -> SlotIndex {
        assert_eq!(
            bytes.len(),
            self.element_size(),
            "Payload size does not match pool element size"
        );
        let index = self.allocate();
        self.arena.get_mut(index as usize).copy_from_slice(bytes);
        index
    }

    /// Allocates a zero-filled slot and returns its index.
    pub fn create_zeroed(&mut self) -> SlotIndex {
        let index = self.allocate();
        self.arena.zero_element(index as usize);
        index
    }

    /// Duplicates the object at `index` into a new slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a live slot.
    pub fn create_from_copy(&mut self, index: SlotIndex) -> SlotIndex {
        assert!(self.is_live(index), "Cannot copy dead pool slot {index}");
        let copy = self.allocate();
        self.arena.copy_element(index as usize, copy as usize);
        copy
    }

    /// Destroys the object at `index` and recycles the slot.
    ///
    /// The slot bytes are zeroed. This is a **O(1)** operation.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not live (never created, or already destroyed).
    pub fn destroy(&mut self, index: SlotIndex) {
        assert!(self.is_live(index), "Pool slot {index} destroyed twice or never created");
        self.arena.zero_element(index as usize);
        self.live[index as usize] = false;
        self.free_list.push(index);
    }

    /// Returns the bytes of the object at `index`.
    #[inline]
    #[must_use]
    pub fn bytes(&self, index: SlotIndex) -> &[u8] {
        debug_assert!(self.is_live(index), "Access to dead pool slot {index}");
        self.arena.get(index as usize)
    }

    /// Returns the mutable bytes of the object at `index`.
    #[inline]
    pub fn bytes_mut(&mut self, index: SlotIndex) -> &mut [u8] {
        debug_assert!(self.is_live(index), "Access to dead pool slot {index}");
        self.arena.get_mut(index as usize)
    }

    /// Returns the bytes of the object at `index`, or `None` if the slot is not live.
    #[inline]
    #[must_use]
    pub fn try_bytes(&self, index: SlotIndex) -> Option<&[u8]> {
        self.is_live(index).then(|| self.arena.get(index as usize))
    }

    /// Views the object at `index` as a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the element size or alignment.
    #[inline]
    #[must_use]
    pub fn get<T: Pod>(&self, index: SlotIndex) -> &T {
        bytemuck::from_bytes(self.bytes(index))
    }

    /// Views the object at `index` as a mutable `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the element size or alignment.
    #[inline]
    pub fn get_mut<T: Pod>(&mut self, index: SlotIndex) -> &mut T {
        bytemuck::from_bytes_mut(self.bytes_mut(index))
    }

    /// Iterates over the indices of all live objects.
    pub fn live_indices(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(index, _)| index as SlotIndex)
    }

    /// Destroys every object. Arena chunks stay allocated.
    pub fn clear(&mut self) {
        for index in 0..self.len {
            if self.live[index] {
                self.arena.zero_element(index);
            }
        }
        self.live.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// Pops a free slot or grows by one, marking the result live.
    fn allocate(&mut self) -> SlotIndex {
        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return index;
        }

        assert!(
            self.len < INVALID_SLOT as usize,
            "Object pool exhausted the slot index space"
        );
        #[allow(clippy::cast_possible_truncation)]
        let index = self.len as SlotIndex;
        self.len += 1;
        self.arena.reserve(self.len);
        self.live.push(true);
        index
    }
}
