//! Buffer recycling keyed by size.

use std::collections::HashMap;

use super::buffer::CellBuffer;

/// Retired buffers kept per size.
const DEFAULT_PER_SIZE: usize = 4;

/// Recycles [`CellBuffer`]s so resizes and frame swaps don't reallocate.
#[derive(Debug)]
pub struct BufferPool {
    free: HashMap<(u16, u16), Vec<CellBuffer>>,
    per_size: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PER_SIZE)
    }

    /// Pool that keeps at most `per_size` buffers for each size.
    pub fn with_capacity(per_size: usize) -> Self {
        Self { free: HashMap::new(), per_size }
    }

    /// A blank buffer of the given size, pooled if one is available.
    ///
    /// The result is indistinguishable from `CellBuffer::new(width, height)`.
    pub fn acquire(&mut self, width: u16, height: u16) -> CellBuffer {
        match self.free.get_mut(&(width, height)).and_then(Vec::pop) {
            Some(mut buf) => {
                buf.reset();
                buf
            }
            None => CellBuffer::new(width, height),
        }
    }

    /// Return a buffer for reuse. Dropped if its size bucket is full.
    pub fn release(&mut self, buf: CellBuffer) {
        let bucket = self.free.entry((buf.width(), buf.height())).or_default();
        if bucket.len() < self.per_size {
            bucket.push(buf);
        }
    }

    /// Buffers currently pooled, across all sizes.
    pub fn len(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pooled buffer.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
