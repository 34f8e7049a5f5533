//! ANSI escape sequences for terminal control.
//!
//! Everything the renderer writes to the terminal goes through here:
//! - Cursor movement and visibility
//! - Screen clearing and the alternate screen
//! - Colors (ANSI 16, 256, and TrueColor)
//! - Text attributes (bold, italic, underline, etc.)
//! - Synchronized output for flicker-free rendering

use std::io::{self, Write};

use crate::types::{Attr, Color};

// =============================================================================
// Cursor
// =============================================================================

/// Move cursor to absolute position (0-indexed in, 1-indexed on the wire).
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y as u32 + 1, x as u32 + 1)
}

#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25l")
}

#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25h")
}

// =============================================================================
// Screen Control
// =============================================================================

/// Clear entire screen (viewport only).
#[inline]
pub fn erase_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J")
}

/// Clear the screen and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J\x1b[H")
}

#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049l")
}

// =============================================================================
// Synchronized Output (DEC mode 2026)
// =============================================================================

/// Begin synchronized output (terminal buffers until end_sync).
#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026h")
}

/// End synchronized output (terminal flushes buffer).
#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026l")
}

// =============================================================================
// Colors
// =============================================================================

/// Reset all attributes and colors.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Set foreground color.
pub fn fg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => write!(w, "\x1b[39m"),
        Color::Named(named) => {
            let index = named.index();
            if index < 8 {
                write!(w, "\x1b[{}m", 30 + index)
            } else {
                write!(w, "\x1b[{}m", 90 + index - 8)
            }
        }
        Color::Indexed(index) => write!(w, "\x1b[38;5;{}m", index),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{};{};{}m", r, g, b),
    }
}

/// Set background color.
pub fn bg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => write!(w, "\x1b[49m"),
        Color::Named(named) => {
            let index = named.index();
            if index < 8 {
                write!(w, "\x1b[{}m", 40 + index)
            } else {
                write!(w, "\x1b[{}m", 100 + index - 8)
            }
        }
        Color::Indexed(index) => write!(w, "\x1b[48;5;{}m", index),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{};{};{}m", r, g, b),
    }
}

// =============================================================================
// Text Attributes
// =============================================================================

const ATTR_CODES: [(Attr, u8); 8] = [
    (Attr::BOLD, 1),
    (Attr::DIM, 2),
    (Attr::ITALIC, 3),
    (Attr::UNDERLINE, 4),
    (Attr::BLINK, 5),
    (Attr::INVERSE, 7),
    (Attr::HIDDEN, 8),
    (Attr::STRIKETHROUGH, 9),
];

/// Set text attributes from bitflags, as one SGR sequence.
pub fn attrs<W: Write>(w: &mut W, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    write!(w, "\x1b[")?;
    let mut first = true;
    for (flag, code) in ATTR_CODES {
        if attr.contains(flag) {
            if !first {
                write!(w, ";")?;
            }
            write!(w, "{}", code)?;
            first = false;
        }
    }
    write!(w, "m")
}
