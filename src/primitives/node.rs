//! Nodes - the per-frame UI description.

use crate::types::{
    AlignItems, AlignSelf, BorderStyle, Borders, Color, Dimension, FlexDirection, FlexWrap,
    JustifyContent, Overflow, TextAlign, TextWrap,
};

use super::types::{Extra, Props};

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Flex container.
    Box,
    /// Leaf text. Children of a text node are ignored.
    Text(String),
    /// Component-defined tag. Laid out and painted as a box.
    Custom(String),
}

/// One element of the UI tree.
///
/// Built fresh on every render pass and never mutated after it is handed to
/// the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub props: Props,
    pub children: Vec<Node>,
}

/// Create a flex container.
///
/// ```
/// use tessel::primitives::{box_node, text};
/// use tessel::types::BorderStyle;
///
/// let ui = box_node()
///     .row()
///     .border(BorderStyle::Rounded)
///     .child(text("left").flex_grow(1.0))
///     .child(text("right"));
/// assert_eq!(ui.children.len(), 2);
/// ```
pub fn box_node() -> Node {
    Node::new(NodeKind::Box)
}

/// Create a text leaf.
pub fn text(content: impl Into<String>) -> Node {
    Node::new(NodeKind::Text(content.into()))
}

/// Create a node with a component-defined tag.
pub fn custom(tag: impl Into<String>) -> Node {
    Node::new(NodeKind::Custom(tag.into()))
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, props: Props::default(), children: Vec::new() }
    }

    /// Text content, for text nodes.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    pub fn width(mut self, value: impl Into<Dimension>) -> Self {
        self.props.width = Some(value.into());
        self
    }

    pub fn height(mut self, value: impl Into<Dimension>) -> Self {
        self.props.height = Some(value.into());
        self
    }

    pub fn min_width(mut self, value: impl Into<Dimension>) -> Self {
        self.props.min_width = Some(value.into());
        self
    }

    pub fn max_width(mut self, value: impl Into<Dimension>) -> Self {
        self.props.max_width = Some(value.into());
        self
    }

    pub fn min_height(mut self, value: impl Into<Dimension>) -> Self {
        self.props.min_height = Some(value.into());
        self
    }

    pub fn max_height(mut self, value: impl Into<Dimension>) -> Self {
        self.props.max_height = Some(value.into());
        self
    }

    // =========================================================================
    // Flex
    // =========================================================================

    pub fn flex_direction(mut self, value: FlexDirection) -> Self {
        self.props.flex_direction = Some(value);
        self
    }

    pub fn row(self) -> Self {
        self.flex_direction(FlexDirection::Row)
    }

    pub fn column(self) -> Self {
        self.flex_direction(FlexDirection::Column)
    }

    pub fn flex_wrap(mut self, value: FlexWrap) -> Self {
        self.props.flex_wrap = Some(value);
        self
    }

    /// Grow factor. Negative and NaN become 0.
    pub fn flex_grow(mut self, value: f32) -> Self {
        self.props.flex_grow = Some(if value.is_finite() { value.max(0.0) } else { 0.0 });
        self
    }

    /// Shrink factor. Negative and NaN become 0.
    pub fn flex_shrink(mut self, value: f32) -> Self {
        self.props.flex_shrink = Some(if value.is_finite() { value.max(0.0) } else { 0.0 });
        self
    }

    pub fn flex_basis(mut self, value: impl Into<Dimension>) -> Self {
        self.props.flex_basis = Some(value.into());
        self
    }

    pub fn justify_content(mut self, value: JustifyContent) -> Self {
        self.props.justify_content = Some(value);
        self
    }

    pub fn align_items(mut self, value: AlignItems) -> Self {
        self.props.align_items = Some(value);
        self
    }

    pub fn align_self(mut self, value: AlignSelf) -> Self {
        self.props.align_self = Some(value);
        self
    }

    pub fn gap(mut self, value: u16) -> Self {
        self.props.gap = Some(value);
        self
    }

    pub fn overflow(mut self, value: Overflow) -> Self {
        self.props.overflow = Some(value);
        self
    }

    // =========================================================================
    // Spacing
    // =========================================================================

    pub fn padding(self, value: u16) -> Self {
        self.padding_x(value).padding_y(value)
    }

    pub fn padding_x(mut self, value: u16) -> Self {
        self.props.padding_left = Some(value);
        self.props.padding_right = Some(value);
        self
    }

    pub fn padding_y(mut self, value: u16) -> Self {
        self.props.padding_top = Some(value);
        self.props.padding_bottom = Some(value);
        self
    }

    pub fn padding_top(mut self, value: u16) -> Self {
        self.props.padding_top = Some(value);
        self
    }

    pub fn padding_right(mut self, value: u16) -> Self {
        self.props.padding_right = Some(value);
        self
    }

    pub fn padding_bottom(mut self, value: u16) -> Self {
        self.props.padding_bottom = Some(value);
        self
    }

    pub fn padding_left(mut self, value: u16) -> Self {
        self.props.padding_left = Some(value);
        self
    }

    pub fn margin(self, value: u16) -> Self {
        self.margin_x(value).margin_y(value)
    }

    pub fn margin_x(mut self, value: u16) -> Self {
        self.props.margin_left = Some(value);
        self.props.margin_right = Some(value);
        self
    }

    pub fn margin_y(mut self, value: u16) -> Self {
        self.props.margin_top = Some(value);
        self.props.margin_bottom = Some(value);
        self
    }

    pub fn margin_top(mut self, value: u16) -> Self {
        self.props.margin_top = Some(value);
        self
    }

    pub fn margin_right(mut self, value: u16) -> Self {
        self.props.margin_right = Some(value);
        self
    }

    pub fn margin_bottom(mut self, value: u16) -> Self {
        self.props.margin_bottom = Some(value);
        self
    }

    pub fn margin_left(mut self, value: u16) -> Self {
        self.props.margin_left = Some(value);
        self
    }

    // =========================================================================
    // Border
    // =========================================================================

    pub fn border(mut self, style: BorderStyle) -> Self {
        self.props.border_style = Some(style);
        self
    }

    pub fn borders(mut self, edges: Borders) -> Self {
        self.props.borders = Some(edges);
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.props.border_color = Some(color);
        self
    }

    // =========================================================================
    // Paint
    // =========================================================================

    pub fn color(mut self, color: Color) -> Self {
        self.props.color = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.props.background_color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.props.bold = Some(true);
        self
    }

    pub fn dim(mut self) -> Self {
        self.props.dim = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.props.italic = Some(true);
        self
    }

    pub fn underline(mut self) -> Self {
        self.props.underline = Some(true);
        self
    }

    pub fn inverse(mut self) -> Self {
        self.props.inverse = Some(true);
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.props.strikethrough = Some(true);
        self
    }

    pub fn text_align(mut self, value: TextAlign) -> Self {
        self.props.text_align = Some(value);
        self
    }

    pub fn text_wrap(mut self, value: TextWrap) -> Self {
        self.props.text_wrap = Some(value);
        self
    }

    /// Attach pass-through data.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Extra>) -> Self {
        self.props.extra.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_props() {
        let node = box_node()
            .row()
            .width(10)
            .height(Dimension::percent(50.0))
            .padding(1)
            .margin_left(2)
            .border(BorderStyle::Single)
            .color(Color::RED)
            .bold();

        assert_eq!(node.kind, NodeKind::Box);
        assert_eq!(node.props.flex_direction, Some(FlexDirection::Row));
        assert_eq!(node.props.width, Some(Dimension::Cells(10)));
        assert_eq!(node.props.height, Some(Dimension::Percent(50.0)));
        assert_eq!(node.props.padding_top, Some(1));
        assert_eq!(node.props.padding_left, Some(1));
        assert_eq!(node.props.margin_left, Some(2));
        assert_eq!(node.props.bold, Some(true));
    }

    #[test]
    fn test_negative_values_clamp() {
        let node = box_node().width(-5).flex_grow(-2.0).flex_shrink(f32::NAN);
        assert_eq!(node.props.width, Some(Dimension::Cells(0)));
        assert_eq!(node.props.flex_grow, Some(0.0));
        assert_eq!(node.props.flex_shrink, Some(0.0));
    }

    #[test]
    fn test_extra_passes_through() {
        let node = custom("button").extra("on_press", "submit").extra("tab_index", 2i64);
        assert_eq!(node.props.extra.get("on_press"), Some(&Extra::Text("submit".into())));
        assert_eq!(node.props.extra.len(), 2);
    }

    #[test]
    fn test_text_content() {
        assert_eq!(text("hi").text_content(), Some("hi"));
        assert_eq!(box_node().text_content(), None);
    }
}
