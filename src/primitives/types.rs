//! Primitive types - Props and pass-through data.
//!
//! Every property the layout engine or painter reads is an explicit `Option`
//! field. `None` means "not set" and falls back to the default (or, for paint
//! properties, to the value inherited from the parent). Anything else a
//! component wants to carry goes in [`Props::extra`] and is never interpreted.

use std::collections::BTreeMap;

use crate::types::{
    AlignItems, AlignSelf, BorderStyle, Borders, Color, Dimension, FlexDirection, FlexWrap,
    JustifyContent, Overflow, TextAlign, TextWrap,
};

/// Opaque component data carried alongside the recognised props.
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Extra {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Extra {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Extra {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Extra {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Extra {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Node properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    // =========================================================================
    // Layout - Container
    // =========================================================================

    /// Flex direction: column (default), row, column-reverse, row-reverse.
    pub flex_direction: Option<FlexDirection>,

    /// Flex wrap: nowrap (default), wrap, wrap-reverse.
    pub flex_wrap: Option<FlexWrap>,

    /// Justify content (default: flex-start).
    pub justify_content: Option<JustifyContent>,

    /// Align items (default: stretch).
    pub align_items: Option<AlignItems>,

    /// Cells between adjacent items on the main axis and between wrapped lines.
    pub gap: Option<u16>,

    /// Overflow (default: visible).
    pub overflow: Option<Overflow>,

    // =========================================================================
    // Layout - Item
    // =========================================================================

    /// Flex grow factor (default: 0).
    pub flex_grow: Option<f32>,

    /// Flex shrink factor (default: 1).
    pub flex_shrink: Option<f32>,

    /// Flex basis (default: auto).
    pub flex_basis: Option<Dimension>,

    /// Align self override (default: auto).
    pub align_self: Option<AlignSelf>,

    // =========================================================================
    // Dimensions
    // =========================================================================

    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_height: Option<Dimension>,

    // =========================================================================
    // Spacing
    // =========================================================================

    pub padding_top: Option<u16>,
    pub padding_right: Option<u16>,
    pub padding_bottom: Option<u16>,
    pub padding_left: Option<u16>,

    pub margin_top: Option<u16>,
    pub margin_right: Option<u16>,
    pub margin_bottom: Option<u16>,
    pub margin_left: Option<u16>,

    // =========================================================================
    // Border
    // =========================================================================

    /// Border glyphs. A border takes one cell on each bordered edge.
    pub border_style: Option<BorderStyle>,

    /// Which edges are bordered (default: all, when a style is set).
    pub borders: Option<Borders>,

    /// Border foreground (default: the node's foreground).
    pub border_color: Option<Color>,

    // =========================================================================
    // Paint (inherited by descendants)
    // =========================================================================

    pub color: Option<Color>,
    pub background_color: Option<Color>,
    pub bold: Option<bool>,
    pub dim: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub inverse: Option<bool>,
    pub strikethrough: Option<bool>,

    // =========================================================================
    // Text
    // =========================================================================

    pub text_align: Option<TextAlign>,
    pub text_wrap: Option<TextWrap>,

    // =========================================================================
    // Pass-through
    // =========================================================================

    /// Component-specific data. Never read by layout or paint.
    pub extra: BTreeMap<String, Extra>,
}

impl Props {
    /// Resolved border edges: empty when no style is set.
    pub fn border_edges(&self) -> Borders {
        match self.border_style {
            None | Some(BorderStyle::None) => Borders::NONE,
            Some(_) => self.borders.unwrap_or(Borders::ALL),
        }
    }

    /// Border plus padding on each side: (top, right, bottom, left).
    pub fn inset(&self) -> (u16, u16, u16, u16) {
        let edges = self.border_edges();
        let b = |flag: Borders| u16::from(edges.contains(flag));
        (
            self.padding_top.unwrap_or(0).saturating_add(b(Borders::TOP)),
            self.padding_right.unwrap_or(0).saturating_add(b(Borders::RIGHT)),
            self.padding_bottom.unwrap_or(0).saturating_add(b(Borders::BOTTOM)),
            self.padding_left.unwrap_or(0).saturating_add(b(Borders::LEFT)),
        )
    }

    /// Margins: (top, right, bottom, left).
    pub fn margins(&self) -> (u16, u16, u16, u16) {
        (
            self.margin_top.unwrap_or(0),
            self.margin_right.unwrap_or(0),
            self.margin_bottom.unwrap_or(0),
            self.margin_left.unwrap_or(0),
        )
    }

    /// Grow factor with invalid values clamped to zero.
    pub fn grow(&self) -> f32 {
        sanitize_factor(self.flex_grow.unwrap_or(0.0))
    }

    /// Shrink factor with invalid values clamped to zero.
    pub fn shrink(&self) -> f32 {
        sanitize_factor(self.flex_shrink.unwrap_or(1.0))
    }
}

fn sanitize_factor(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_default_is_empty() {
        let props = Props::default();
        assert_eq!(props.border_edges(), Borders::NONE);
        assert_eq!(props.inset(), (0, 0, 0, 0));
        assert_eq!(props.grow(), 0.0);
        assert_eq!(props.shrink(), 1.0);
    }

    #[test]
    fn test_inset_includes_border() {
        let props = Props {
            border_style: Some(BorderStyle::Single),
            padding_left: Some(2),
            ..Default::default()
        };
        assert_eq!(props.inset(), (1, 1, 1, 3));

        let partial = Props {
            border_style: Some(BorderStyle::Rounded),
            borders: Some(Borders::TOP | Borders::BOTTOM),
            ..Default::default()
        };
        assert_eq!(partial.inset(), (1, 0, 1, 0));
    }

    #[test]
    fn test_factors_clamp() {
        let props = Props {
            flex_grow: Some(-3.0),
            flex_shrink: Some(f32::NAN),
            ..Default::default()
        };
        assert_eq!(props.grow(), 0.0);
        assert_eq!(props.shrink(), 0.0);
    }

    #[test]
    fn test_extra_from() {
        assert_eq!(Extra::from("x"), Extra::Text("x".into()));
        assert_eq!(Extra::from(3i64), Extra::Int(3));
        assert_eq!(Extra::from(true), Extra::Bool(true));
    }
}
