//! Output buffering and stateful cell rendering.
//!
//! These components keep terminal output small by:
//! - Batching writes into a single flush
//! - Tracking terminal state to avoid redundant escape codes
//! - Only emitting changes (colors, attributes, cursor position)

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;

use super::ansi;
use super::buffer::{CellBuffer, Patch};
use super::cell::{Cell, Style};

// =============================================================================
// OutputBuffer
// =============================================================================

/// Accumulates a frame's bytes so the sink sees one write.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear the buffer without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write everything to `writer`, flush it, and empty the buffer.
    pub fn flush_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the accumulated data as a string (lossy).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.data)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// StatefulCellRenderer
// =============================================================================

/// Renders cells while tracking terminal state to minimize output.
///
/// It tracks the cursor position and the active style. It assumes the
/// terminal starts in the reset state, which holds because every frame
/// ends with a reset.
#[derive(Debug, Default)]
pub struct StatefulCellRenderer {
    cursor: Option<(u16, u16)>,
    style: Style,
}

impl StatefulCellRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cursor position and assume the reset style.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.style = Style::default();
    }

    /// Move to `style` with as few SGR codes as possible.
    ///
    /// Adding attributes or changing colors is incremental. Removing an
    /// attribute or returning a color to default needs a full reset first.
    pub fn apply_style<W: Write>(&mut self, out: &mut W, style: Style) -> io::Result<()> {
        if style == self.style {
            return Ok(());
        }

        let removed = !(self.style.attrs - style.attrs).is_empty()
            || (!self.style.fg.is_default() && style.fg.is_default())
            || (!self.style.bg.is_default() && style.bg.is_default());
        if removed {
            ansi::reset(out)?;
            self.style = Style::default();
        }

        ansi::attrs(out, style.attrs - self.style.attrs)?;
        if style.fg != self.style.fg {
            ansi::fg(out, style.fg)?;
        }
        if style.bg != self.style.bg {
            ansi::bg(out, style.bg)?;
        }
        self.style = style;
        Ok(())
    }

    /// Render one cell at an absolute position.
    ///
    /// Continuation cells print nothing; their lead already covered them.
    pub fn render_cell<W: Write>(&mut self, out: &mut W, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if cell.continuation {
            return Ok(());
        }

        if self.cursor != Some((x, y)) {
            ansi::cursor_to(out, x, y)?;
        }
        self.apply_style(out, cell.style())?;
        write!(out, "{}", cell.symbol)?;

        let advance = cell.width().max(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    /// Render a cell for inline output (no cursor positioning).
    pub fn render_cell_inline<W: Write>(&mut self, out: &mut W, cell: &Cell) -> io::Result<()> {
        if cell.continuation {
            return Ok(());
        }
        self.apply_style(out, cell.style())?;
        write!(out, "{}", cell.symbol)
    }

    /// Return the terminal to the reset style if anything is active.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.style.is_plain() {
            ansi::reset(out)?;
            self.style = Style::default();
        }
        Ok(())
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Write patches as cursor moves, SGR codes and text.
///
/// When two patches target the same cell the later one wins. Cells are
/// emitted row-major so adjacent cells in a row share one cursor move.
/// Anything written ends with a reset.
pub fn write_patches<W: Write>(out: &mut W, patches: &[Patch]) -> io::Result<()> {
    if patches.is_empty() {
        return Ok(());
    }

    let mut latest: BTreeMap<(u16, u16), &Cell> = BTreeMap::new();
    for patch in patches {
        latest.insert((patch.y, patch.x), &patch.cell);
    }

    let mut renderer = StatefulCellRenderer::new();
    for ((y, x), cell) in latest {
        renderer.render_cell(out, x, y, cell)?;
    }
    ansi::reset(out)
}

/// [`write_patches`] into a string.
pub fn patches_to_ansi(patches: &[Patch]) -> String {
    let mut out = OutputBuffer::new();
    if let Err(err) = write_patches(&mut out, patches) {
        tracing::warn!(%err, "patch encoding failed");
    }
    out.into_string()
}

/// Serialise a whole buffer as lines of styled text, without cursor moves.
///
/// Rows are joined by `\n`. Trailing unstyled blanks are trimmed and no
/// style carries across a line break.
pub fn write_buffer<W: Write>(out: &mut W, buffer: &CellBuffer) -> io::Result<()> {
    let mut renderer = StatefulCellRenderer::new();
    for y in 0..buffer.height() {
        if y > 0 {
            writeln!(out)?;
        }
        let Some(row) = buffer.row(y) else {
            continue;
        };
        let end = row.iter().rposition(|c| !c.is_blank()).map_or(0, |i| i + 1);
        for cell in &row[..end] {
            renderer.render_cell_inline(out, cell)?;
        }
        renderer.finish(out)?;
    }
    Ok(())
}

/// [`write_buffer`] into a string.
pub fn buffer_to_ansi(buffer: &CellBuffer) -> String {
    let mut out = OutputBuffer::new();
    if let Err(err) = write_buffer(&mut out, buffer) {
        tracing::warn!(%err, "buffer encoding failed");
    }
    out.into_string()
}

// =============================================================================
// CaptureSink
// =============================================================================

/// An in-memory output sink whose clones share one byte buffer.
///
/// Hand one clone to the renderer and keep another to inspect what was
/// written.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }

    /// Return and clear everything written so far.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.bytes.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text_measure::strip_ansi;
    use crate::renderer::cell::Symbol;
    use crate::types::{Attr, Color};

    fn cell(c: char, fg: Color) -> Cell {
        Cell::new(Symbol::Char(c), Style::new(fg, Color::Default, Attr::NONE))
    }

    fn patch(x: u16, y: u16, cell: Cell) -> Patch {
        Patch { x, y, cell }
    }

    #[test]
    fn test_output_buffer_write() {
        let mut buf = OutputBuffer::new();
        buf.write_str("hello");
        buf.write_str(" world");
        assert_eq!(buf.as_str().as_ref(), "hello world");

        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert!(buf.is_empty());
        assert_eq!(sink, b"hello world");
    }

    #[test]
    fn test_colored_run_bounded_by_reset() {
        let out = patches_to_ansi(&[patch(0, 0, cell('H', Color::RED)), patch(1, 0, cell('i', Color::Default))]);
        assert_eq!(strip_ansi(&out), "Hi");
        assert_eq!(out, "\x1b[1;1H\x1b[31mH\x1b[0mi\x1b[0m");
    }

    #[test]
    fn test_adjacent_cells_share_cursor_move() {
        let patches: Vec<Patch> = "abc".chars().enumerate().map(|(i, c)| patch(i as u16 + 2, 1, cell(c, Color::Default))).collect();
        let out = patches_to_ansi(&patches);
        assert_eq!(out.matches('H').count(), 1);
        assert_eq!(out, "\x1b[2;3Habc\x1b[0m");
    }

    #[test]
    fn test_gap_needs_cursor_move() {
        let out = patches_to_ansi(&[patch(0, 0, cell('a', Color::Default)), patch(5, 0, cell('b', Color::Default))]);
        assert_eq!(out, "\x1b[1;1Ha\x1b[1;6Hb\x1b[0m");
    }

    #[test]
    fn test_later_patch_wins() {
        let out = patches_to_ansi(&[patch(0, 0, cell('a', Color::Default)), patch(0, 0, cell('b', Color::Default))]);
        assert_eq!(strip_ansi(&out), "b");
    }

    #[test]
    fn test_sgr_only_on_change() {
        let patches: Vec<Patch> = (0..4).map(|x| patch(x, 0, cell('x', Color::BLUE))).collect();
        let out = patches_to_ansi(&patches);
        assert_eq!(out.matches("\x1b[34m").count(), 1);
    }

    #[test]
    fn test_wide_char_advances_cursor() {
        let style = Style::default();
        let out = patches_to_ansi(&[
            patch(0, 0, Cell::new(Symbol::Char('你'), style)),
            patch(1, 0, Cell::continuation(style)),
            patch(2, 0, cell('!', Color::Default)),
        ]);
        assert_eq!(out, "\x1b[1;1H你!\x1b[0m");
    }

    #[test]
    fn test_empty_patches_write_nothing() {
        assert_eq!(patches_to_ansi(&[]), "");
    }

    #[test]
    fn test_attr_add_then_remove() {
        let mut renderer = StatefulCellRenderer::new();
        let mut out = Vec::new();
        let bold = Style::new(Color::Default, Color::Default, Attr::BOLD);
        let bold_italic = Style::new(Color::Default, Color::Default, Attr::BOLD | Attr::ITALIC);
        renderer.apply_style(&mut out, bold).unwrap();
        renderer.apply_style(&mut out, bold_italic).unwrap();
        renderer.apply_style(&mut out, bold).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\x1b[1m\x1b[3m\x1b[0m\x1b[1m");
    }

    #[test]
    fn test_buffer_to_ansi_trims_rows() {
        let mut buf = CellBuffer::new(6, 2);
        buf.draw_text(0, 0, "hi", Style::default(), None);
        buf.draw_text(1, 1, "yo", Style::new(Color::GREEN, Color::Default, Attr::NONE), None);
        let out = buffer_to_ansi(&buf);
        assert_eq!(strip_ansi(&out), "hi\n yo");
        assert!(out.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_capture_sink_shares_bytes() {
        let sink = CaptureSink::new();
        let mut writer = sink.clone();
        write!(writer, "frame").unwrap();
        assert_eq!(sink.contents(), "frame");
        assert_eq!(sink.take(), "frame");
        assert!(sink.is_empty());
    }
}
