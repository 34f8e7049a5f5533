//! Text Measurement
//!
//! Display width, wrapping and truncation in terminal cells.
//!
//! Width rules:
//! - ASCII printable: 1 cell, controls: 0
//! - East Asian wide/fullwidth: 2 cells (`unicode-width` tables)
//! - Emoji, including ZWJ families, skin tones, flags and keycaps: 2 cells
//! - Combining marks: 0 (they ride on their base grapheme)
//! - ANSI escape sequences: 0 (stripped before measuring)
//!
//! Everything operates on grapheme clusters (`unicode-segmentation`), so a
//! wrap or a truncation never splits a user-perceived character.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Ellipsis appended by [`truncate_text`].
pub const ELLIPSIS: &str = "…";

// =============================================================================
// ANSI STRIPPING
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Text,
    /// Just saw ESC.
    Escape,
    /// Inside `ESC [` ... final byte.
    Csi,
    /// Inside OSC/DCS/PM/APC, terminated by BEL or `ESC \`.
    Terminated,
    /// Saw ESC inside a terminated string.
    TerminatedEscape,
}

/// Remove ANSI escape sequences.
///
/// Borrows when the input has no ESC byte.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut state = Scan::Text;

    for c in s.chars() {
        state = match (state, c) {
            (Scan::Text, '\x1b') => Scan::Escape,
            (Scan::Text, c) => {
                out.push(c);
                Scan::Text
            }
            (Scan::Escape, '[') => Scan::Csi,
            (Scan::Escape, ']' | 'P' | '^' | '_') => Scan::Terminated,
            // Two-character sequence (ESC 7, ESC M, ...).
            (Scan::Escape, _) => Scan::Text,
            (Scan::Csi, '\x40'..='\x7e') => Scan::Text,
            (Scan::Csi, '\x20'..='\x3f') => Scan::Csi,
            // Malformed CSI: drop the sequence, keep the byte.
            (Scan::Csi, c) => {
                if c == '\x1b' {
                    Scan::Escape
                } else {
                    out.push(c);
                    Scan::Text
                }
            }
            (Scan::Terminated, '\x07') => Scan::Text,
            (Scan::Terminated, '\x1b') => Scan::TerminatedEscape,
            (Scan::Terminated, _) => Scan::Terminated,
            (Scan::TerminatedEscape, '\\') => Scan::Text,
            (Scan::TerminatedEscape, _) => Scan::Terminated,
        };
    }

    Cow::Owned(out)
}

// =============================================================================
// WIDTH
// =============================================================================

/// Display width of one codepoint.
#[inline]
pub fn char_width(c: char) -> usize {
    match c as u32 {
        // Pictographs most terminals draw wide even when the tables say 1.
        0x2600..=0x27BF
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1F9FF
        | 0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Display width of one grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    let rest = chars.as_str();
    if rest.is_empty() {
        return char_width(first);
    }

    // Regional indicator pair (flag).
    if ('\u{1F1E6}'..='\u{1F1FF}').contains(&first) {
        return 2;
    }

    // ZWJ, VS16, skin tone, keycap: emoji presentation.
    let emoji_sequence = rest.chars().any(|c| {
        matches!(c, '\u{200D}' | '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}' | '\u{20E3}')
    });
    if emoji_sequence {
        return 2;
    }

    // Base plus combining marks.
    char_width(first)
}

/// Display width of a string, ignoring ANSI escapes.
pub fn string_width(s: &str) -> usize {
    if s.is_ascii() && !s.contains('\x1b') {
        return s.bytes().filter(|b| (0x20..0x7f).contains(b)).count();
    }
    strip_ansi(s).graphemes(true).map(grapheme_width).sum()
}

/// Widest line, splitting on `\n`.
pub fn max_line_width(s: &str) -> usize {
    s.split('\n').map(string_width).max().unwrap_or(0)
}

/// Grapheme clusters paired with their widths.
pub fn graphemes_with_width(s: &str) -> impl Iterator<Item = (&str, usize)> {
    s.graphemes(true).map(|g| (g, grapheme_width(g)))
}

// =============================================================================
// WRAPPING
// =============================================================================

/// Wrap text to `max_width` cells.
///
/// Breaks at word boundaries where possible and falls back to grapheme
/// breaks for words longer than a line. Explicit `\n` always breaks.
/// Whitespace at a soft break is dropped.
///
/// Empty input yields no lines. A zero width leaves lines unbroken.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if max_width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut line = LineBuilder::new(max_width);
        for word in raw.split_word_bounds() {
            line.push_word(word, &mut lines);
        }
        lines.push(line.finish());
    }
    lines
}

struct LineBuilder {
    max: usize,
    current: String,
    width: usize,
}

impl LineBuilder {
    fn new(max: usize) -> Self {
        Self { max, current: String::new(), width: 0 }
    }

    fn break_line(&mut self, lines: &mut Vec<String>) {
        let done = std::mem::take(&mut self.current);
        lines.push(done.trim_end().to_string());
        self.width = 0;
    }

    fn push_word(&mut self, word: &str, lines: &mut Vec<String>) {
        let w = string_width(word);
        if self.width + w <= self.max {
            self.current.push_str(word);
            self.width += w;
            return;
        }

        let blank = word.chars().all(char::is_whitespace);
        if self.width > 0 {
            self.break_line(lines);
        }
        if blank {
            return;
        }
        if w <= self.max {
            self.current.push_str(word);
            self.width = w;
            return;
        }

        // Longer than a whole line: hard-break by grapheme.
        for (g, gw) in graphemes_with_width(word) {
            if self.width + gw > self.max && self.width > 0 {
                self.break_line(lines);
            }
            self.current.push_str(g);
            self.width += gw;
        }
    }

    fn finish(self) -> String {
        self.current
    }
}

/// Lines `text` occupies when wrapped to `max_width`.
pub fn measure_text_height(text: &str, max_width: usize) -> usize {
    wrap_text(text, max_width).len()
}

// =============================================================================
// TRUNCATION
// =============================================================================

/// Cut `text` to `max_width` cells, ending in [`ELLIPSIS`] when shortened.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if string_width(text) <= max_width {
        return text.to_string();
    }

    let budget = max_width - string_width(ELLIPSIS).min(max_width);
    let mut out = String::new();
    let mut used = 0;
    for (g, gw) in graphemes_with_width(text) {
        if used + gw > budget {
            break;
        }
        out.push_str(g);
        used += gw;
    }
    if budget < max_width {
        out.push_str(ELLIPSIS);
    }
    out
}
