//! Painter - walks a laid-out node tree and fills a CellBuffer.
//!
//! Depth-first, parents before children, so later nodes overwrite earlier
//! cells. There is no blending: a cell is whatever was written last.
//!
//! Per node:
//! 1. Resolve the style: fg, bg and attributes cascade from the parent
//! 2. Fill the border box with the node's own background, if it sets one
//! 3. Draw border glyphs on the bordered edges
//! 4. Text nodes draw their lines inside the content box
//! 5. Children paint, clipped to the content box when `Overflow::Hidden`

use crate::layout::text_measure::{string_width, strip_ansi, truncate_text, wrap_text};
use crate::layout::LayoutNode;
use crate::primitives::{Node, NodeKind, Props};
use crate::renderer::{Cell, CellBuffer, Style, Symbol};
use crate::types::{Attr, Borders, Overflow, Rect, TextAlign, TextWrap};

/// Paint `node` (laid out as `layout`) into `buffer`.
pub fn paint(buffer: &mut CellBuffer, node: &Node, layout: &LayoutNode) {
    paint_node(buffer, node, layout, Style::default(), None);
}

fn paint_node(
    buffer: &mut CellBuffer,
    node: &Node,
    layout: &LayoutNode,
    inherited: Style,
    clip: Option<Rect>,
) {
    let props = &node.props;
    let style = resolve_style(props, inherited);
    let bounds = layout.rect();

    if !bounds.is_empty() {
        if let Some(bg) = props.background_color {
            buffer.fill_rect(bounds, bg, clip.as_ref());
        }
        paint_border(buffer, props, bounds, style, clip.as_ref());
        if let NodeKind::Text(content) = &node.kind {
            paint_text(buffer, content, props, layout.content, style, clip);
        }
    }

    let child_clip = match props.overflow.unwrap_or_default() {
        Overflow::Visible => clip,
        Overflow::Hidden => {
            let content = match clip {
                Some(clip) => clip.intersect(&layout.content),
                None => Some(layout.content),
            };
            match content {
                Some(content) => Some(content),
                None => return,
            }
        }
    };

    for (child, child_layout) in node.children.iter().zip(&layout.children) {
        paint_node(buffer, child, child_layout, style, child_clip);
    }
}

/// Cascade paint props over the parent's style.
fn resolve_style(props: &Props, parent: Style) -> Style {
    let mut attrs = parent.attrs;
    for (flag, value) in [
        (Attr::BOLD, props.bold),
        (Attr::DIM, props.dim),
        (Attr::ITALIC, props.italic),
        (Attr::UNDERLINE, props.underline),
        (Attr::INVERSE, props.inverse),
        (Attr::STRIKETHROUGH, props.strikethrough),
    ] {
        if let Some(on) = value {
            attrs.set(flag, on);
        }
    }

    Style::new(
        props.color.unwrap_or(parent.fg),
        props.background_color.unwrap_or(parent.bg),
        attrs,
    )
}

fn paint_border(buffer: &mut CellBuffer, props: &Props, bounds: Rect, style: Style, clip: Option<&Rect>) {
    let edges = props.border_edges();
    if edges.is_empty() {
        return;
    }

    let (horizontal, vertical, top_left, top_right, bottom_right, bottom_left) =
        props.border_style.unwrap_or_default().chars();
    let border = Style::new(props.border_color.unwrap_or(style.fg), style.bg, Attr::NONE);
    let mut put = |x: u16, y: u16, c: char| {
        buffer.set_cell(x, y, Cell::new(Symbol::Char(c), border), clip);
    };

    let (left, top) = (bounds.x, bounds.y);
    let (right, bottom) = (bounds.right() - 1, bounds.bottom() - 1);

    if edges.contains(Borders::TOP) {
        for x in left..=right {
            put(x, top, horizontal);
        }
    }
    if edges.contains(Borders::BOTTOM) {
        for x in left..=right {
            put(x, bottom, horizontal);
        }
    }
    if edges.contains(Borders::LEFT) {
        for y in top..=bottom {
            put(left, y, vertical);
        }
    }
    if edges.contains(Borders::RIGHT) {
        for y in top..=bottom {
            put(right, y, vertical);
        }
    }

    // Corners only where both edges meet
    if edges.contains(Borders::TOP | Borders::LEFT) {
        put(left, top, top_left);
    }
    if edges.contains(Borders::TOP | Borders::RIGHT) {
        put(right, top, top_right);
    }
    if edges.contains(Borders::BOTTOM | Borders::RIGHT) {
        put(right, bottom, bottom_right);
    }
    if edges.contains(Borders::BOTTOM | Borders::LEFT) {
        put(left, bottom, bottom_left);
    }
}

fn paint_text(
    buffer: &mut CellBuffer,
    content: &str,
    props: &Props,
    area: Rect,
    style: Style,
    clip: Option<Rect>,
) {
    let clip = match clip {
        Some(clip) => clip.intersect(&area),
        None => (!area.is_empty()).then_some(area),
    };
    let Some(clip) = clip else {
        return;
    };

    let text = strip_ansi(content);
    let width = area.width as usize;
    let lines: Vec<String> = match props.text_wrap.unwrap_or_default() {
        TextWrap::Wrap => wrap_text(&text, width),
        TextWrap::NoWrap => text.lines().map(str::to_string).collect(),
        TextWrap::Truncate => text.lines().next().map(|line| truncate_text(line, width)).into_iter().collect(),
    };

    let align = props.text_align.unwrap_or_default();
    for (row, line) in lines.iter().enumerate().take(area.height as usize) {
        let slack = width.saturating_sub(string_width(line));
        let offset = match align {
            TextAlign::Left => 0,
            TextAlign::Center => slack / 2,
            TextAlign::Right => slack,
        };
        buffer.draw_text(
            area.x.saturating_add(offset as u16),
            area.y.saturating_add(row as u16),
            line,
            style,
            Some(&clip),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::primitives::{box_node, text};
    use crate::renderer::buffer_to_ansi;
    use crate::types::{BorderStyle, Color};

    fn render(node: &Node, width: u16, height: u16) -> CellBuffer {
        let layout = compute_layout(node, width, height, true);
        let mut buffer = CellBuffer::new(width, height);
        paint(&mut buffer, node, &layout);
        buffer
    }

    fn plain(buffer: &CellBuffer) -> String {
        strip_ansi(&buffer_to_ansi(buffer)).into_owned()
    }

    #[test]
    fn test_paint_text() {
        let buffer = render(&text("hello"), 10, 1);
        assert_eq!(plain(&buffer), "hello");
    }

    #[test]
    fn test_paint_border() {
        let node = box_node().width(4).height(3).border(BorderStyle::Single);
        let buffer = render(&node, 4, 3);
        assert_eq!(plain(&buffer), "┌──┐\n│  │\n└──┘");
    }

    #[test]
    fn test_partial_borders() {
        let node = box_node()
            .width(3)
            .height(2)
            .border(BorderStyle::Ascii)
            .borders(Borders::TOP | Borders::BOTTOM);
        let buffer = render(&node, 3, 2);
        assert_eq!(plain(&buffer), "---\n---");
    }

    #[test]
    fn test_style_cascades() {
        let node = box_node()
            .color(Color::RED)
            .background(Color::BLUE)
            .bold()
            .child(text("a"))
            .child(text("b").color(Color::GREEN));
        let buffer = render(&node, 3, 2);

        let a = buffer.get(0, 0).cloned().unwrap_or_default();
        assert_eq!((a.fg, a.bg), (Color::RED, Color::BLUE));
        assert!(a.attrs.contains(Attr::BOLD));

        let b = buffer.get(0, 1).cloned().unwrap_or_default();
        assert_eq!(b.fg, Color::GREEN);
        assert_eq!(b.bg, Color::BLUE);

        // Background fills the whole box, not just the text.
        assert_eq!(buffer.get(2, 1).map(|c| c.bg), Some(Color::BLUE));
    }

    #[test]
    fn test_text_align_and_wrap() {
        let node = box_node()
            .width(7)
            .child(text("ab").text_align(TextAlign::Right))
            .child(text("ab").text_align(TextAlign::Center))
            .child(text("one two three"));
        let layout = compute_layout(&node, 7, 10, false);
        let mut buffer = CellBuffer::new(7, layout.height);
        paint(&mut buffer, &node, &layout);
        assert_eq!(plain(&buffer), "     ab\n  ab\none two\nthree");
    }

    #[test]
    fn test_truncate() {
        let node = box_node().row().child(text("abcdefgh").text_wrap(TextWrap::Truncate).width(5));
        let buffer = render(&node, 10, 1);
        assert_eq!(plain(&buffer), "abcd…");
    }

    #[test]
    fn test_overflow_hidden_clips_children() {
        let node = box_node()
            .width(3)
            .height(1)
            .overflow(Overflow::Hidden)
            .child(text("abcdef").text_wrap(TextWrap::NoWrap).width(6));
        let buffer = render(&node, 8, 1);
        assert_eq!(plain(&buffer), "abc");
    }

    #[test]
    fn test_child_overwrites_parent() {
        let node = box_node()
            .width(4)
            .height(3)
            .border(BorderStyle::Ascii)
            .background(Color::BLUE)
            .child(box_node().background(Color::RED).height(1));
        let buffer = render(&node, 4, 3);

        // Child sits inside the border and repaints its row.
        assert_eq!(buffer.get(1, 1).map(|c| c.bg), Some(Color::RED));
        assert_eq!(buffer.get(2, 1).map(|c| c.bg), Some(Color::RED));
        assert_eq!(buffer.get(0, 1).map(|c| c.bg), Some(Color::BLUE));
        assert_eq!(buffer.get(1, 2).map(|c| c.bg), Some(Color::BLUE));
    }

    #[test]
    fn test_ansi_in_text_is_stripped() {
        let buffer = render(&text("\x1b[31mred\x1b[0m"), 5, 1);
        assert_eq!(plain(&buffer), "red");
    }
}
