//! Core types for tessel.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reactive pipeline and define what the renderer understands.

// =============================================================================
// Color
// =============================================================================

/// The sixteen standard terminal palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl NamedColor {
    /// Palette slot (0-15).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// A cell color.
///
/// Each variant is its own representation kind. Equality is only defined
/// within a kind: `Named(Red)`, `Indexed(1)` and `Rgb(255, 0, 0)` may look
/// alike on screen, but they never compare equal, so the diff always
/// re-emits a cell whose color changed representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (let terminal pick).
    #[default]
    Default,
    /// One of the 16 standard palette entries.
    Named(NamedColor),
    /// 256-color palette index.
    ///
    /// - 0-15: Standard colors
    /// - 16-231: 6x6x6 RGB cube
    /// - 232-255: Grayscale
    Indexed(u8),
    /// Truecolor.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Named(NamedColor::Black);
    pub const RED: Self = Self::Named(NamedColor::Red);
    pub const GREEN: Self = Self::Named(NamedColor::Green);
    pub const YELLOW: Self = Self::Named(NamedColor::Yellow);
    pub const BLUE: Self = Self::Named(NamedColor::Blue);
    pub const MAGENTA: Self = Self::Named(NamedColor::Magenta);
    pub const CYAN: Self = Self::Named(NamedColor::Cyan);
    pub const WHITE: Self = Self::Named(NamedColor::White);

    /// Check if this is the terminal default color.
    #[inline]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Create a truecolor value from a packed `0xRRGGBB` integer.
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self::Rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Parse hex color string (#RGB, #RRGGBB).
    ///
    /// Returns None for invalid format.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessel::types::Color;
    ///
    /// assert_eq!(Color::from_hex("#ff0000"), Some(Color::Rgb(255, 0, 0)));
    /// assert_eq!(Color::from_hex("#fff"), Some(Color::Rgb(255, 255, 255)));
    /// assert_eq!(Color::from_hex("0000ff"), Some(Color::Rgb(0, 0, 255)));
    /// assert!(Color::from_hex("#gg0000").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            // #RGB -> expand to #RRGGBB
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            6 => {
                let r = hex_byte(bytes, 0)?;
                let g = hex_byte(bytes, 2)?;
                let b = hex_byte(bytes, 4)?;
                Some(Self::Rgb(r, g, b))
            }
            _ => None,
        }
    }
}

impl From<NamedColor> for Color {
    fn from(value: NamedColor) -> Self {
        Self::Named(value)
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Which edges of a box carry a border.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Borders: u8 {
        const NONE = 0;
        const TOP = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT = 1 << 3;
        const ALL = Self::TOP.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

// =============================================================================
// Dimension - Supports absolute and percentage values
// =============================================================================

/// A dimension value that can be absolute (cells) or percentage.
///
/// - `Auto`: Auto-size based on content
/// - `Cells(n)`: Absolute value in terminal cells
/// - `Percent(n)`: Percentage of parent content size (0-100)
///
/// Percentages are only resolved while distributing space, against the
/// parent's already-resolved content box.
///
/// # Examples
///
/// ```
/// use tessel::types::Dimension;
///
/// let width = Dimension::Cells(50);
/// let height = Dimension::percent(100.0);
/// assert_eq!(Dimension::from(-4), Dimension::Cells(0));
/// assert_eq!(Dimension::percent(f32::NAN), Dimension::Percent(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Cells(u16),
    Percent(f32),
}

impl Dimension {
    /// Percentage dimension. NaN and negative values clamp to zero.
    pub fn percent(value: f32) -> Self {
        if value.is_nan() || value < 0.0 {
            Self::Percent(0.0)
        } else {
            Self::Percent(value)
        }
    }

    #[inline]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl From<u16> for Dimension {
    fn from(value: u16) -> Self {
        Self::Cells(value)
    }
}

impl From<i32> for Dimension {
    /// Negative sizes clamp to zero cells.
    fn from(value: i32) -> Self {
        Self::Cells(value.clamp(0, u16::MAX as i32) as u16)
    }
}

// =============================================================================
// Rect - Geometry, clipping, damage
// =============================================================================

/// An axis-aligned rectangle in cell coordinates.
///
/// Used for layout content boxes, paint clipping and buffer damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute intersection of two rects.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Smallest rect covering both. Empty rects are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Border glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None,
    /// ─ │ ┌ ┐ └ ┘
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// ┄ ┆ ┌ ┐ └ ┘
    Dashed,
    /// - | + + + +
    Ascii,
    /// █ █ █ █ █ █
    Block,
}

impl BorderStyle {
    /// Get the border characters for this style.
    ///
    /// Returns: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(&self) -> (char, char, char, char, char, char) {
        match self {
            Self::None => (' ', ' ', ' ', ' ', ' ', ' '),
            Self::Single => ('─', '│', '┌', '┐', '┘', '└'),
            Self::Double => ('═', '║', '╔', '╗', '╝', '╚'),
            Self::Rounded => ('─', '│', '╭', '╮', '╯', '╰'),
            Self::Bold => ('━', '┃', '┏', '┓', '┛', '┗'),
            Self::Dashed => ('┄', '┆', '┌', '┐', '┘', '└'),
            Self::Ascii => ('-', '|', '+', '+', '+', '+'),
            Self::Block => ('█', '█', '█', '█', '█', '█'),
        }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// =============================================================================
// Flex Enums - For layout
// =============================================================================

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Check if this is a reverse direction (ColumnReverse or RowReverse).
    pub const fn is_reverse(&self) -> bool {
        matches!(self, Self::ColumnReverse | Self::RowReverse)
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    /// Lines stack from the cross-end towards the cross-start.
    WrapReverse,
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
}

/// Align self (item override for align items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
}

impl AlignSelf {
    /// Resolve against the parent's `align_items`.
    pub const fn resolve(&self, parent: AlignItems) -> AlignItems {
        match self {
            Self::Auto => parent,
            Self::Stretch => AlignItems::Stretch,
            Self::FlexStart => AlignItems::FlexStart,
            Self::Center => AlignItems::Center,
            Self::FlexEnd => AlignItems::FlexEnd,
        }
    }
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overflow {
    #[default]
    Visible,
    /// Descendants are clipped to the content box.
    Hidden,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextWrap {
    NoWrap,
    #[default]
    Wrap,
    /// Single line, cut with an ellipsis.
    Truncate,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#abc"), Some(Color::Rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!(Color::from_hex("  #00ff00  "), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#AaBbCc"), Color::from_hex("#aabbcc"));
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("#gg0000").is_none());
        assert!(Color::from_hex("#f").is_none());
        assert!(Color::from_hex("#ff").is_none());
        assert!(Color::from_hex("").is_none());
    }

    #[test]
    fn test_color_kinds_never_equal() {
        assert_ne!(Color::RED, Color::Indexed(1));
        assert_ne!(Color::Indexed(1), Color::Rgb(128, 0, 0));
        assert_ne!(Color::Default, Color::Indexed(0));
        assert_eq!(Color::from_rgb_int(0x282a36), Color::Rgb(40, 42, 54));
    }

    #[test]
    fn test_dimension_clamps() {
        assert_eq!(Dimension::from(-1), Dimension::Cells(0));
        assert_eq!(Dimension::from(70_000), Dimension::Cells(u16::MAX));
        assert_eq!(Dimension::percent(-10.0), Dimension::Percent(0.0));
        assert_eq!(Dimension::percent(f32::NAN), Dimension::Percent(0.0));
        assert_eq!(Dimension::percent(50.0), Dimension::Percent(50.0));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 5, 5)));

        let c = Rect::new(20, 20, 2, 2);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(1, 1, 2, 2);
        let b = Rect::new(8, 0, 1, 5);
        assert_eq!(a.union(&b), Rect::new(1, 0, 8, 5));
        assert_eq!(Rect::default().union(&b), b);
        assert_eq!(a.union(&Rect::default()), a);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(2, 3, 4, 1);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 3));
        assert!(!r.contains(6, 3));
        assert!(!r.contains(2, 4));
    }

    #[test]
    fn test_align_self_resolve() {
        assert_eq!(AlignSelf::Auto.resolve(AlignItems::Center), AlignItems::Center);
        assert_eq!(AlignSelf::FlexEnd.resolve(AlignItems::Center), AlignItems::FlexEnd);
    }

    #[test]
    fn test_borders_all() {
        assert!(Borders::ALL.contains(Borders::TOP | Borders::LEFT));
        assert_eq!(Borders::default(), Borders::NONE);
    }
}
