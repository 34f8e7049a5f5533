//! CellBuffer and drawing primitives.
//!
//! The CellBuffer is a 2D grid of Cells that represents what should be displayed
//! on the terminal. All drawing operations work on this buffer.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing.
//! - **Clipping**: drawing functions accept an optional clip rect for `Overflow::Hidden`.
//! - **Wide characters**: a wide grapheme writes a lead cell plus a continuation
//!   cell. A write that would leave the continuation off-grid (or outside the
//!   clip) is dropped, and overwriting either half of a pair blanks the other.
//! - **Damage**: one bounding rect that grows only when a cell actually
//!   changes. Diffing can stay inside it.

use crate::layout::text_measure::{grapheme_width, graphemes_with_width};
use crate::types::{Color, Rect};

use super::cell::{Cell, Style, Symbol};

/// One changed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

// =============================================================================
// CellBuffer
// =============================================================================

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    damage: Option<Rect>,
}

impl CellBuffer {
    /// Create a new buffer filled with blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            damage: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Get a cell reference (None if out of bounds).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells of one row.
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + self.width as usize])
    }

    // =========================================================================
    // Damage
    // =========================================================================

    /// Bounding rect of every cell changed since the damage was last reset.
    #[inline]
    pub fn damage(&self) -> Option<Rect> {
        self.damage
    }

    /// Mark a region as changed.
    pub fn invalidate(&mut self, rect: Rect) {
        let Some(rect) = rect.intersect(&self.bounds()) else {
            return;
        };
        self.damage = Some(match self.damage {
            Some(d) => d.union(&rect),
            None => rect,
        });
    }

    #[inline]
    pub fn reset_damage(&mut self) {
        self.damage = None;
    }

    /// Write a cell at a valid index, growing damage only on change.
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        let idx = self.index(x, y);
        if self.cells[idx] != cell {
            self.cells[idx] = cell;
            self.invalidate(Rect::new(x, y, 1, 1));
        }
    }

    // =========================================================================
    // Whole-buffer operations
    // =========================================================================

    /// Blank every cell. Damage covers whatever was not blank.
    pub fn clear(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.put(x, y, Cell::default());
            }
        }
    }

    /// Blank every cell and forget damage; the buffer becomes
    /// indistinguishable from `CellBuffer::new(width, height)`.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.damage = None;
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width as usize * height as usize, Cell::default());
        self.damage = None;
    }

    /// Become a copy of `other`, adopting its size. Damage is reset.
    pub fn copy_from(&mut self, other: &CellBuffer) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
        self.damage = None;
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell with optional clipping.
    ///
    /// Overwriting half of a wide pair blanks the other half. Continuation
    /// cells cannot be written this way; use [`CellBuffer::put_grapheme`].
    /// Returns true if the cell was set.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell, clip: Option<&Rect>) -> bool {
        if !self.in_bounds(x, y) || cell.continuation {
            return false;
        }
        if let Some(clip) = clip {
            if !clip.contains(x, y) {
                return false;
            }
        }
        if cell.width() > 1 {
            let style = cell.style();
            return self.put_symbol(x, y, cell.symbol, style, 2, clip);
        }
        self.break_pair(x, y);
        self.put(x, y, cell);
        true
    }

    /// Blank whatever wide pair `(x, y)` belongs to, keeping its style.
    fn break_pair(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].continuation {
            if x > 0 {
                let lead = self.cells[idx - 1].style();
                self.put(x - 1, y, Cell::blank(lead));
            }
            let style = self.cells[idx].style();
            self.put(x, y, Cell::blank(style));
        } else if x + 1 < self.width && self.cells[idx + 1].continuation {
            let style = self.cells[idx + 1].style();
            self.put(x + 1, y, Cell::blank(style));
        }
    }

    fn put_symbol(
        &mut self,
        x: u16,
        y: u16,
        symbol: Symbol,
        style: Style,
        width: usize,
        clip: Option<&Rect>,
    ) -> bool {
        if width == 2 {
            let fits = x.checked_add(1).is_some_and(|next| {
                self.in_bounds(next, y) && clip.is_none_or(|c| c.contains(next, y))
            });
            if !fits {
                return false;
            }
            self.break_pair(x, y);
            self.break_pair(x + 1, y);
            self.put(x, y, Cell::new(symbol, style));
            self.put(x + 1, y, Cell::continuation(style));
        } else {
            self.break_pair(x, y);
            self.put(x, y, Cell::new(symbol, style));
        }
        true
    }

    /// Write one grapheme cluster.
    ///
    /// Returns the columns consumed, or 0 if the write was dropped.
    pub fn put_grapheme(
        &mut self,
        x: u16,
        y: u16,
        grapheme: &str,
        style: Style,
        clip: Option<&Rect>,
    ) -> u16 {
        let width = grapheme_width(grapheme);
        if width == 0 || !self.in_bounds(x, y) {
            return 0;
        }
        if let Some(clip) = clip {
            if !clip.contains(x, y) {
                return 0;
            }
        }
        let width = width.min(2);
        if self.put_symbol(x, y, Symbol::from_grapheme(grapheme), style, width, clip) {
            width as u16
        } else {
            0
        }
    }

    /// Fill a rectangle with blank cells of `bg`.
    pub fn fill_rect(&mut self, rect: Rect, bg: Color, clip: Option<&Rect>) {
        let mut area = match rect.intersect(&self.bounds()) {
            Some(area) => area,
            None => return,
        };
        if let Some(clip) = clip {
            area = match area.intersect(clip) {
                Some(area) => area,
                None => return,
            };
        }

        let blank = Cell::blank(Style::new(Color::Default, bg, Default::default()));
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.break_pair(x, y);
                self.put(x, y, blank.clone());
            }
        }
    }

    /// Draw text at a position, one cell per grapheme.
    ///
    /// Stops at the right edge. Returns the number of columns used.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, style: Style, clip: Option<&Rect>) -> u16 {
        let mut col = x;
        for (grapheme, width) in graphemes_with_width(text) {
            if width == 0 {
                continue;
            }
            if col >= self.width {
                break;
            }
            let used = self.put_grapheme(col, y, grapheme, style, clip);
            // A dropped wide write still advances, so later text keeps its column.
            col = col.saturating_add(if used == 0 { width.min(2) as u16 } else { used });
        }
        col - x
    }

    // =========================================================================
    // Diffing
    // =========================================================================

    /// Patches that turn `self` into `next`.
    pub fn diff(&self, next: &CellBuffer) -> Vec<Patch> {
        self.diff_within(next, next.bounds())
    }

    /// Like [`CellBuffer::diff`], but only looks inside `region`.
    ///
    /// Cells outside the region must already match. A size mismatch ignores
    /// the region and returns every cell of `next`.
    pub fn diff_within(&self, next: &CellBuffer, region: Rect) -> Vec<Patch> {
        if self.width != next.width || self.height != next.height {
            return next.patches();
        }
        let Some(region) = region.intersect(&next.bounds()) else {
            return Vec::new();
        };

        let mut patches = Vec::new();
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let idx = self.index(x, y);
                let cell = &next.cells[idx];
                if self.cells[idx] != *cell {
                    patches.push(Patch { x, y, cell: cell.clone() });
                }
            }
        }
        patches
    }

    /// Every cell as a patch, row-major.
    pub fn patches(&self) -> Vec<Patch> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| Patch {
                x: (i % self.width as usize) as u16,
                y: (i / self.width as usize) as u16,
                cell: cell.clone(),
            })
            .collect()
    }

    /// Write patches verbatim. Out-of-bounds patches are skipped.
    pub fn apply_patches(&mut self, patches: &[Patch]) {
        for patch in patches {
            if self.in_bounds(patch.x, patch.y) {
                self.put(patch.x, patch.y, patch.cell.clone());
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attr;

    fn red() -> Style {
        Style::new(Color::RED, Color::Default, Attr::NONE)
    }

    #[test]
    fn test_new_buffer() {
        let buf = CellBuffer::new(10, 3);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.cells().len(), 30);
        assert!(buf.damage().is_none());
        assert!(buf.cells().iter().all(Cell::is_blank));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = CellBuffer::new(4, 2);
        assert!(buf.get(4, 0).is_none());
        assert!(buf.get(0, 2).is_none());
        assert!(!buf.set_cell(9, 9, Cell::default(), None));
        assert_eq!(buf.put_grapheme(4, 0, "x", red(), None), 0);
        assert!(buf.damage().is_none());
    }

    #[test]
    fn test_damage_grows_only_on_change() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set_cell(2, 3, Cell::default(), None);
        assert!(buf.damage().is_none());

        buf.put_grapheme(2, 3, "a", red(), None);
        buf.put_grapheme(5, 7, "b", red(), None);
        assert_eq!(buf.damage(), Some(Rect::new(2, 3, 4, 5)));

        buf.reset_damage();
        assert!(buf.damage().is_none());
    }

    #[test]
    fn test_wide_char_pairs() {
        let mut buf = CellBuffer::new(5, 1);
        assert_eq!(buf.put_grapheme(1, 0, "你", red(), None), 2);
        assert_eq!(buf.get(1, 0).map(|c| &c.symbol), Some(&Symbol::Char('你')));
        let cont = buf.get(2, 0).cloned();
        assert_eq!(cont, Some(Cell::continuation(red())));
    }

    #[test]
    fn test_set_cell_wide_writes_pair() {
        let mut buf = CellBuffer::new(5, 1);
        assert!(buf.set_cell(1, 0, Cell::new(Symbol::Char('世'), red()), None));
        assert_eq!(buf.get(1, 0).map(|c| &c.symbol), Some(&Symbol::Char('世')));
        assert_eq!(buf.get(2, 0).cloned(), Some(Cell::continuation(red())));

        assert!(!buf.set_cell(4, 0, Cell::new(Symbol::Char('世'), red()), None));
    }

    #[test]
    fn test_wide_char_at_last_column_dropped() {
        let mut buf = CellBuffer::new(5, 1);
        assert_eq!(buf.put_grapheme(4, 0, "你", red(), None), 0);
        assert!(buf.get(4, 0).is_some_and(Cell::is_blank));
        assert!(buf.damage().is_none());
    }

    #[test]
    fn test_wide_char_clipped_continuation_dropped() {
        let mut buf = CellBuffer::new(5, 1);
        let clip = Rect::new(0, 0, 2, 1);
        assert_eq!(buf.put_grapheme(1, 0, "你", red(), Some(&clip)), 0);
        assert_eq!(buf.put_grapheme(0, 0, "你", red(), Some(&clip)), 2);
    }

    #[test]
    fn test_overwrite_half_clears_other() {
        let mut buf = CellBuffer::new(6, 1);
        buf.put_grapheme(2, 0, "你", red(), None);

        // Overwrite the continuation: the lead goes blank.
        buf.put_grapheme(3, 0, "x", Style::default(), None);
        assert_eq!(buf.get(2, 0), Some(&Cell::blank(red())));
        assert!(!buf.get(3, 0).is_some_and(|c| c.continuation));

        // Overwrite the lead: the continuation goes blank.
        buf.put_grapheme(0, 0, "好", red(), None);
        buf.put_grapheme(0, 0, "y", Style::default(), None);
        assert_eq!(buf.get(1, 0), Some(&Cell::blank(red())));
    }

    #[test]
    fn test_wide_over_wide_offset() {
        let mut buf = CellBuffer::new(6, 1);
        buf.put_grapheme(0, 0, "你", red(), None);
        buf.put_grapheme(1, 0, "好", red(), None);
        assert_eq!(buf.get(0, 0), Some(&Cell::blank(red())));
        assert_eq!(buf.get(1, 0).map(|c| &c.symbol), Some(&Symbol::Char('好')));
        assert!(buf.get(2, 0).is_some_and(|c| c.continuation));
    }

    #[test]
    fn test_draw_text() {
        let mut buf = CellBuffer::new(10, 1);
        let used = buf.draw_text(1, 0, "a你b", red(), None);
        assert_eq!(used, 4);
        assert_eq!(buf.get(4, 0).map(|c| &c.symbol), Some(&Symbol::Char('b')));

        let mut small = CellBuffer::new(3, 1);
        small.draw_text(0, 0, "abcdef", red(), None);
        assert_eq!(small.get(2, 0).map(|c| &c.symbol), Some(&Symbol::Char('c')));
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut buf = CellBuffer::new(10, 10);
        let clip = Rect::new(0, 0, 3, 3);
        buf.fill_rect(Rect::new(1, 1, 5, 5), Color::BLUE, Some(&clip));
        assert_eq!(buf.get(2, 2).map(|c| c.bg), Some(Color::BLUE));
        assert_eq!(buf.get(3, 3).map(|c| c.bg), Some(Color::Default));
        assert_eq!(buf.damage(), Some(Rect::new(1, 1, 2, 2)));
    }

    #[test]
    fn test_diff_and_apply() {
        let a = CellBuffer::new(4, 2);
        let mut b = a.clone();
        b.draw_text(0, 1, "hi", red(), None);

        assert!(a.diff(&a).is_empty());
        let patches = a.diff(&b);
        assert_eq!(patches.len(), 2);
        assert_eq!((patches[0].x, patches[0].y), (0, 1));

        let mut applied = a.clone();
        applied.apply_patches(&patches);
        assert_eq!(applied.cells(), b.cells());
    }

    #[test]
    fn test_diff_size_mismatch_is_full() {
        let a = CellBuffer::new(2, 2);
        let b = CellBuffer::new(3, 1);
        assert_eq!(a.diff(&b).len(), 3);
    }

    #[test]
    fn test_clear_and_reset() {
        let mut buf = CellBuffer::new(4, 4);
        buf.draw_text(1, 1, "x", red(), None);
        buf.reset_damage();
        buf.clear();
        assert_eq!(buf.damage(), Some(Rect::new(1, 1, 1, 1)));

        buf.draw_text(0, 0, "y", red(), None);
        buf.reset();
        assert_eq!(buf, CellBuffer::new(4, 4));
    }
}
