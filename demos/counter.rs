//! Counter Example - a live render loop
//!
//! Demonstrates:
//! - A component that reads signals
//! - Input handling that writes signals
//! - Exiting with Ctrl+C (or `q`)
//!
//! Run with: cargo run --example counter
//! Logs: RUST_LOG=tessel=trace cargo run --example counter 2> frames.log

use std::time::Instant;

use crossterm::event::{Event, KeyCode};
use tracing_subscriber::EnvFilter;

use tessel::{
    box_node, create_memo, create_signal, render, text, AlignItems, BorderStyle, Color,
    JustifyContent, RenderOptions, TextAlign,
};

fn main() -> tessel::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (count, set_count) = create_signal(0i64);
    let (quit, set_quit) = create_signal(false);
    let parity = {
        let count = count.clone();
        create_memo(move || if count.get() % 2 == 0 { "even" } else { "odd" })
    };
    let started = Instant::now();

    let options = RenderOptions::new()
        .with_alternate_screen(true)
        .on_error(|err| tracing::error!(%err, "frame failed"))
        .on_input(move |event| {
            let Event::Key(key) = event else {
                return;
            };
            match key.code {
                KeyCode::Up | KeyCode::Char('+') => set_count.update(|n| *n += 1),
                KeyCode::Down | KeyCode::Char('-') => set_count.update(|n| *n -= 1),
                KeyCode::Char('r') => set_count.set(0),
                KeyCode::Char('q') => set_quit.set(true),
                _ => {}
            }
        });

    let handle = render(
        move || {
            let value = count.get();
            let color = if value < 0 { Color::RED } else { Color::GREEN };
            box_node()
                .justify_content(JustifyContent::Center)
                .align_items(AlignItems::Center)
                .child(
                    box_node()
                        .border(BorderStyle::Rounded)
                        .border_color(Color::CYAN)
                        .padding_x(2)
                        .width(30)
                        .child(text("tessel counter").bold().text_align(TextAlign::Center))
                        .child(text(format!("{value}")).color(color).text_align(TextAlign::Center))
                        .child(text(parity.get()).dim().text_align(TextAlign::Center))
                        .child(text("↑/+ inc  ↓/- dec  r reset  q quit").dim()),
                )
        },
        options,
    )?;

    while handle.tick()? {
        if quit.get_untracked() {
            handle.exit();
        }
    }

    let frames = handle.frame_count();
    handle.unmount()?;
    println!("{frames} frames in {:.1?}", started.elapsed());
    Ok(())
}
