//! Front/back buffer pair for differential rendering.
//!
//! The front buffer is what the terminal shows. Each frame:
//!
//! 1. [`DoubleBuffer::begin_frame`] makes the back buffer a blank canvas
//!    whose damage already covers every cell the front had drawn.
//! 2. The painter draws into the back buffer, growing damage as it goes.
//! 3. [`DoubleBuffer::swap`] diffs back against front inside the damage
//!    rect, exchanges the two, and returns the patches.
//! 4. If the patches never reach the terminal, [`DoubleBuffer::rollback`]
//!    puts the previous frame back in front.
//!
//! A resize swaps both buffers for pooled ones of the new size and forces
//! the next swap to emit every cell.

use super::buffer::{CellBuffer, Patch};
use super::pool::BufferPool;

#[derive(Debug)]
pub struct DoubleBuffer {
    front: CellBuffer,
    back: CellBuffer,
    pool: BufferPool,
    full_redraw: bool,
    frame_count: u64,
    /// Set by `swap`, cleared by anything that invalidates the old front.
    can_rollback: bool,
}

impl DoubleBuffer {
    /// Create a pair of blank buffers. The first swap is a full redraw.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_pool(width, height, BufferPool::new())
    }

    pub fn with_pool(width: u16, height: u16, mut pool: BufferPool) -> Self {
        let front = pool.acquire(width, height);
        let back = pool.acquire(width, height);
        Self { front, back, pool, full_redraw: true, frame_count: 0, can_rollback: false }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.front.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.front.height()
    }

    /// Last presented frame.
    #[inline]
    pub fn front(&self) -> &CellBuffer {
        &self.front
    }

    #[inline]
    pub fn back(&self) -> &CellBuffer {
        &self.back
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut CellBuffer {
        &mut self.back
    }

    /// Swaps completed so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// True when the next swap will emit every cell.
    #[inline]
    pub fn needs_full_redraw(&self) -> bool {
        self.full_redraw
    }

    /// Make the next swap a full redraw.
    pub fn invalidate(&mut self) {
        self.full_redraw = true;
    }

    /// Prepare the back buffer for painting and return it.
    pub fn begin_frame(&mut self) -> &mut CellBuffer {
        self.can_rollback = false;
        self.back.copy_from(&self.front);
        self.back.clear();
        &mut self.back
    }

    /// Diff back against front, exchange them, and return the patches.
    pub fn swap(&mut self) -> Vec<Patch> {
        let sizes_agree =
            self.front.width() == self.back.width() && self.front.height() == self.back.height();

        let patches = if self.full_redraw || !sizes_agree {
            self.back.patches()
        } else {
            match self.back.damage() {
                Some(region) => self.front.diff_within(&self.back, region),
                None => Vec::new(),
            }
        };

        std::mem::swap(&mut self.front, &mut self.back);
        self.front.reset_damage();
        self.full_redraw = false;
        self.frame_count += 1;
        self.can_rollback = true;
        patches
    }

    /// Undo the last swap after its patches failed to reach the terminal.
    ///
    /// The previous frame becomes the front again. The terminal may hold part
    /// of the undelivered frame, so the next swap repaints every cell.
    /// Returns false if there is no swap to undo.
    pub fn rollback(&mut self) -> bool {
        if !self.can_rollback {
            return false;
        }
        std::mem::swap(&mut self.front, &mut self.back);
        self.front.reset_damage();
        self.full_redraw = true;
        self.frame_count -= 1;
        self.can_rollback = false;
        true
    }

    /// Resize both buffers. Returns false if the size is unchanged.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if self.front.width() == width
            && self.front.height() == height
            && self.back.width() == width
            && self.back.height() == height
        {
            return false;
        }

        let front = std::mem::replace(&mut self.front, self.pool.acquire(width, height));
        let back = std::mem::replace(&mut self.back, self.pool.acquire(width, height));
        self.pool.release(front);
        self.pool.release(back);
        self.full_redraw = true;
        self.can_rollback = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::cell::Style;
    use crate::types::{Attr, Color};

    fn paint(db: &mut DoubleBuffer, x: u16, text: &str) {
        db.begin_frame().draw_text(x, 0, text, Style::new(Color::GREEN, Color::Default, Attr::NONE), None);
    }

    #[test]
    fn test_first_swap_is_full() {
        let mut db = DoubleBuffer::new(4, 2);
        paint(&mut db, 0, "ab");
        assert_eq!(db.swap().len(), 8);
        assert_eq!(db.frame_count(), 1);
        assert!(!db.needs_full_redraw());
    }

    #[test]
    fn test_unchanged_frame_is_empty() {
        let mut db = DoubleBuffer::new(4, 2);
        paint(&mut db, 0, "ab");
        db.swap();
        paint(&mut db, 0, "ab");
        assert!(db.swap().is_empty());
    }

    #[test]
    fn test_moved_text_patches_both_places() {
        let mut db = DoubleBuffer::new(6, 1);
        paint(&mut db, 0, "ab");
        db.swap();

        paint(&mut db, 3, "ab");
        let patches = db.swap();
        let xs: Vec<u16> = patches.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 1, 3, 4]);
        assert!(patches[0].cell.is_blank());

        let mut expected = CellBuffer::new(6, 1);
        expected.draw_text(3, 0, "ab", Style::new(Color::GREEN, Color::Default, Attr::NONE), None);
        assert_eq!(db.front().cells(), expected.cells());
    }

    #[test]
    fn test_rollback_restores_previous_front() {
        let mut db = DoubleBuffer::new(4, 1);
        paint(&mut db, 0, "ab");
        db.swap();
        let shown = db.front().clone();

        paint(&mut db, 0, "cd");
        db.swap();
        assert!(db.rollback());

        assert_eq!(db.front().cells(), shown.cells());
        assert_eq!(db.frame_count(), 1);
        assert!(db.needs_full_redraw());
        assert!(!db.rollback(), "only the latest swap can be undone");

        paint(&mut db, 0, "cd");
        assert_eq!(db.swap().len(), 4);
    }

    #[test]
    fn test_rollback_without_swap_is_noop() {
        let mut db = DoubleBuffer::new(4, 1);
        assert!(!db.rollback());

        paint(&mut db, 0, "ab");
        db.swap();
        paint(&mut db, 0, "cd");
        assert!(!db.rollback(), "a new frame has begun");
    }

    #[test]
    fn test_resize_forces_full_redraw() {
        let mut db = DoubleBuffer::new(4, 2);
        paint(&mut db, 0, "ab");
        db.swap();

        assert!(!db.resize(4, 2));
        assert!(db.resize(3, 3));
        assert_eq!(db.pool().len(), 2);
        assert!(db.needs_full_redraw());

        paint(&mut db, 0, "x");
        assert_eq!(db.swap().len(), 9);
    }
}
