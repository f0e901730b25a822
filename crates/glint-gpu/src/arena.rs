//! Scratch memory for decoded texel data.
//!
//! The DDS loader does not own pixel storage; callers inject an allocator
//! per call and keep the backing bytes alive for as long as the emitted
//! subresources reference them.

use std::fmt;

/// Round `value` up to the nearest multiple of `alignment`.
///
/// `alignment` must be > 0.
pub fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment > 0);

    // `value + alignment - 1` can overflow for pathological inputs, so use
    // a checked path and fall back to the largest aligned value.
    let add = alignment - 1;
    match value.checked_add(add) {
        Some(v) => v / alignment * alignment,
        None => u64::MAX / alignment * alignment,
    }
}

/// Caller-scoped scratch allocator consumed by the DDS loader.
///
/// `alloc` reserves `size` bytes at a multiple of `align` and returns the
/// byte offset of the reservation inside the caller-owned buffer together
/// with the writable slice. Offsets are stable for the lifetime of the
/// allocator, so [`crate::dds::Subresource::data_offset`] can index into
/// the backing storage after the call returns.
pub trait ScratchAllocator {
    fn alloc(&mut self, size: usize, align: usize) -> Option<(usize, &mut [u8])>;
}

/// A linear bump allocator over an owned byte buffer.
#[derive(Clone)]
pub struct ScratchArena {
    bytes: Vec<u8>,
    cursor: usize,
}

impl ScratchArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Reset the cursor without touching the backing bytes.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// The backing bytes; subresource offsets index into this slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ScratchAllocator for ScratchArena {
    fn alloc(&mut self, size: usize, align: usize) -> Option<(usize, &mut [u8])> {
        let align = align.max(1);
        let aligned = align_up(self.cursor as u64, align as u64) as usize;
        let end = aligned.checked_add(size)?;
        if end > self.bytes.len() {
            return None;
        }

        self.cursor = end;
        Some((aligned, &mut self.bytes[aligned..end]))
    }
}

impl fmt::Debug for ScratchArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchArena")
            .field("capacity", &self.bytes.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
