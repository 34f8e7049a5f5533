//! Static Render Example - one-shot layout and paint
//!
//! Demonstrates `render_once`: no terminal setup, no diffing. The tree is
//! laid out at a fixed width and printed as styled lines.
//!
//! Run with: cargo run --example static_render

use tracing_subscriber::EnvFilter;

use tessel::{
    box_node, render_once, text, BorderStyle, Color, Dimension, FlexWrap, JustifyContent,
    TextWrap,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let width = crossterm::terminal::size().map(|(w, _)| w.min(72)).unwrap_or(72);

    let card = |title: &str, body: &str, color: Color| {
        box_node()
            .border(BorderStyle::Single)
            .border_color(color)
            .padding_x(1)
            .width(Dimension::percent(50.0))
            .child(text(title).bold().color(color))
            .child(text(body))
    };

    let ui = box_node()
        .border(BorderStyle::Double)
        .padding(1)
        .gap(1)
        .child(
            box_node()
                .row()
                .justify_content(JustifyContent::SpaceBetween)
                .child(text("tessel").bold())
                .child(text("render_once").italic().color(Color::YELLOW)),
        )
        .child(
            box_node()
                .row()
                .flex_wrap(FlexWrap::Wrap)
                .child(card("signals", "Fine-grained reactive state with batching.", Color::CYAN))
                .child(card("layout", "Integer flexbox over the cell grid.", Color::MAGENTA))
                .child(card("renderer", "Double-buffered diff with minimal ANSI.", Color::GREEN))
                .child(card("wide text", "世界 and 🇯🇵 take two cells each.", Color::YELLOW)),
        )
        .child(
            text("This footer is far too long to fit on one line, so it is cut short with an ellipsis.")
                .text_wrap(TextWrap::Truncate)
                .dim(),
        );

    println!("{}", render_once(&ui, width));
}
