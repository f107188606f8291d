//! # Block Arena
//!
//! Chunked, index-addressed byte storage for fixed-size elements.
//!
//! ```text
//! index 0..4096      index 4096..8192     index 8192..
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   chunk 0    │   │   chunk 1    │   │   chunk 2    │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Growing appends a chunk; existing chunks are never moved, so an index
//! stays addressable for the lifetime of the arena.

/// Backing word of every chunk. Its alignment bounds component alignment.
type Word = u128;

const WORD_SIZE: usize = std::mem::size_of::<Word>();

/// Largest component alignment the arena can honor.
pub const MAX_COMPONENT_ALIGN: usize = std::mem::align_of::<Word>();

/// Default number of elements per chunk.
pub const DEFAULT_CHUNK_LEN: usize = 4096;

/// A growable arena of fixed-size byte elements.
///
/// The arena carries no type information: it knows the element size and
/// the chunk length, nothing else. Typed views are layered on top by
/// [`ObjectPool`](super::ObjectPool).
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = BlockArena::new(8, 1024);
/// arena.reserve(10);
/// arena.get_mut(3).copy_from_slice(&42u64.to_ne_bytes());
/// ```
#[derive(Debug)]
pub struct BlockArena {
    /// Size of one element in bytes.
    element_size: usize,
    /// Elements per chunk.
    chunk_len: usize,
    /// Word count of a single chunk.
    chunk_words: usize,
    /// Allocated chunks. Boxes keep their address when this vector grows.
    chunks: Vec<Box<[Word]>>,
}

impl BlockArena {
    /// Creates an empty arena. No chunk is allocated until [`reserve`](Self::reserve).
    ///
    /// # Arguments
    ///
    /// * `element_size` - Size of one element in bytes (may be zero)
    /// * `chunk_len` - Number of elements per chunk
    ///
    /// # Panics
    ///
    /// Panics if `chunk_len` is zero.
    #[must_use]
    pub fn new(element_size: usize, chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "Chunk length must be greater than zero");

        Self {
            element_size,
            chunk_len,
            chunk_words: (element_size * chunk_len).div_ceil(WORD_SIZE),
            chunks: Vec::new(),
        }
    }

    /// Returns the element size in bytes.
    #[inline]
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.element_size
    }

    /// Returns the number of elements per chunk.
    #[inline]
    #[must_use]
    pub const fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Returns the number of allocated chunks.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the number of addressable elements.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_len
    }

    /// Guarantees at least `capacity` addressable elements.
    ///
    /// New chunks are zero-filled. Existing chunks are left in place.
    pub fn reserve(&mut self, capacity: usize) {
        while self.capacity() < capacity {
            self.chunks
                .push(vec![0; self.chunk_words].into_boxed_slice());
        }
    }

    /// Returns the bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the reserved capacity.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &[u8] {
        debug_assert!(index < self.capacity(), "Arena index {index} out of bounds");
        let (chunk, offset) = self.locate(index);
        &bytemuck::cast_slice::<Word, u8>(&self.chunks[chunk][..])[offset..offset + self.element_size]
    }

    /// Returns the mutable bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the reserved capacity.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(index < self.capacity(), "Arena index {index} out of bounds");
        let (chunk, offset) = self.locate(index);
        let size = self.element_size;
        &mut bytemuck::cast_slice_mut::<Word, u8>(&mut self.chunks[chunk][..])[offset..offset + size]
    }

    /// Copies the element at `src` over the element at `dst`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the reserved capacity.
    pub fn copy_element(&mut self, src: usize, dst: usize) {
        if src == dst || self.element_size == 0 {
            return;
        }
        let size = self.element_size;
        let (src_chunk, src_offset) = self.locate(src);
        let (dst_chunk, dst_offset) = self.locate(dst);

        if src_chunk == dst_chunk {
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.chunks[src_chunk][..]);
            bytes.copy_within(src_offset..src_offset + size, dst_offset);
            return;
        }

        // Two distinct chunks: split the chunk list so both can be borrowed.
        let (low, high) = self.chunks.split_at_mut(src_chunk.max(dst_chunk));
        let (src_words, dst_words) = if src_chunk < dst_chunk {
            (&low[src_chunk], &mut high[0])
        } else {
            (&high[0], &mut low[dst_chunk])
        };
        let src_bytes: &[u8] = bytemuck::cast_slice(&src_words[..]);
        let dst_bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut dst_words[..]);
        dst_bytes[dst_offset..dst_offset + size]
            .copy_from_slice(&src_bytes[src_offset..src_offset + size]);
    }

    /// Zero-fills the element at `index`.
    #[inline]
    pub fn zero_element(&mut self, index: usize) {
        self.get_mut(index).fill(0);
    }

    /// Maps an element index to its chunk and byte offset within that chunk.
    #[inline]
    const fn locate(&self, index: usize) -> (usize, usize) {
        (
            index / self.chunk_len,
            (index % self.chunk_len) * self.element_size,
        )
    }
}
