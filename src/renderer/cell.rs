//! Cell and symbol types.

use std::fmt;
use std::rc::Rc;

use crate::layout::text_measure::{char_width, grapheme_width};
use crate::types::{Attr, Color};

// =============================================================================
// Symbol
// =============================================================================

/// What a cell displays.
///
/// Most cells hold a single `char`. Multi-codepoint graphemes (emoji ZWJ
/// sequences, flags, combining marks) are shared as `Rc<str>` so copying a
/// buffer does not reallocate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Right half of a wide character.
    Empty,
    Char(char),
    Cluster(Rc<str>),
}

impl Symbol {
    /// Build a symbol from one grapheme cluster.
    pub fn from_grapheme(grapheme: &str) -> Self {
        let mut chars = grapheme.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Self::Empty,
            (Some(c), None) => Self::Char(c),
            _ => Self::Cluster(Rc::from(grapheme)),
        }
    }

    /// Display width in cells.
    pub fn width(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Char(c) => char_width(*c),
            Self::Cluster(s) => grapheme_width(s),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::Char(' ')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Char(c) => write!(f, "{c}"),
            Self::Cluster(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Style
// =============================================================================

/// Colors and attributes shared by a run of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    pub const fn new(fg: Color, bg: Color, attrs: Attr) -> Self {
        Self { fg, bg, attrs }
    }

    /// True when this is the terminal's reset state.
    #[inline]
    pub fn is_plain(&self) -> bool {
        self.fg.is_default() && self.bg.is_default() && self.attrs.is_empty()
    }
}

// =============================================================================
// Cell
// =============================================================================

/// A single terminal cell.
///
/// A wide grapheme occupies two cells: the lead holds the symbol, the one to
/// its right is a continuation with [`Symbol::Empty`] and the same style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub symbol: Symbol,
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
    pub continuation: bool,
}

impl Cell {
    /// A space with the given style.
    pub fn blank(style: Style) -> Self {
        Self::new(Symbol::Char(' '), style)
    }

    pub fn new(symbol: Symbol, style: Style) -> Self {
        Self {
            symbol,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
            continuation: false,
        }
    }

    /// Right half of a wide character drawn with `style`.
    pub fn continuation(style: Style) -> Self {
        Self {
            symbol: Symbol::Empty,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
            continuation: true,
        }
    }

    #[inline]
    pub fn style(&self) -> Style {
        Style::new(self.fg, self.bg, self.attrs)
    }

    /// Columns the symbol covers when written.
    #[inline]
    pub fn width(&self) -> usize {
        self.symbol.width()
    }

    /// Default space, no style.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.symbol == Symbol::Char(' ') && !self.continuation && self.style().is_plain()
    }
}
