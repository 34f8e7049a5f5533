//! Mount API - render-root lifecycle and the render effect.
//!
//! [`render`] builds one render root: the injected terminal collaborators,
//! a [`DoubleBuffer`] and a single effect that turns the component into
//! terminal output. Nothing here is global; two roots never share state.
//!
//! # Architecture
//!
//! ```text
//! component signal ─┐
//! size signal ──────┼──► render effect ──► layout ──► paint ──► swap/diff ──► sink
//! signals it reads ─┘
//! ```
//!
//! The effect reads the component, the size and (through the component)
//! every signal the UI depends on, so any write to them produces exactly
//! one new frame. A panic or I/O failure while drawing is reported to
//! `on_error` and the previous frame stays on screen.
//!
//! # Example
//!
//! ```no_run
//! use tessel::pipeline::{render, RenderOptions};
//! use tessel::primitives::text;
//! use tessel::signals::create_signal;
//!
//! let (count, set_count) = create_signal(0);
//! let handle = render(move || text(format!("count: {}", count.get())), RenderOptions::new())?;
//!
//! set_count.set(1); // redraws
//! handle.wait_until_exit()?; // until Ctrl+C
//! handle.unmount()?;
//! # Ok::<(), tessel::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;

use crate::error::{panic_message, Error, Result};
use crate::layout::{compute_layout, reset_titan_arrays};
use crate::primitives::Node;
use crate::renderer::{ansi, buffer_to_ansi, write_patches, CellBuffer, DoubleBuffer, OutputBuffer, Patch};
use crate::signals::{self, create_effect, create_signal, with_error_boundary, Effect, ErrorHandler, ReadSignal, WriteSignal};

use super::options::{ErrorCallback, InputCallback, RenderOptions};
use super::paint::paint;
use super::terminal::{is_ctrl_c, InputSource, SizeProvider};

/// A root component: called once per frame.
type Component = Rc<dyn Fn() -> Node>;

// =============================================================================
// Render Root
// =============================================================================

/// Per-root state. Shared between the render effect and the handle.
struct Root {
    output: RefCell<Box<dyn Write>>,
    size: RefCell<Box<dyn SizeProvider>>,
    input: RefCell<Box<dyn InputSource>>,
    frames: RefCell<DoubleBuffer>,
    scratch: RefCell<OutputBuffer>,
    alternate_screen: bool,
    exit_on_ctrl_c: bool,
    hide_cursor: bool,
    synchronized_output: bool,
    poll_interval: Duration,
    on_error: Option<ErrorCallback>,
    on_input: Option<InputCallback>,
    torn_down: Cell<bool>,
}

impl Root {
    fn report(&self, err: &Error) {
        tracing::warn!(error = %err, "frame failed");
        if let Some(on_error) = &self.on_error {
            on_error(err);
        }
    }

    /// Terminal setup before the first frame.
    fn enter(&self) -> Result<()> {
        self.input.borrow_mut().enable()?;

        let mut out = OutputBuffer::with_capacity(64);
        if self.alternate_screen {
            ansi::enter_alt_screen(&mut out)?;
        }
        if self.hide_cursor {
            ansi::cursor_hide(&mut out)?;
        }
        out.flush_to(&mut **self.output.borrow_mut())?;
        Ok(())
    }

    /// Undo `enter`. Runs once; later calls are no-ops.
    fn leave(&self) -> Result<()> {
        if self.torn_down.replace(true) {
            return Ok(());
        }

        let height = self.frames.borrow().height();
        let mut out = OutputBuffer::with_capacity(64);
        ansi::reset(&mut out)?;
        if self.alternate_screen {
            ansi::exit_alt_screen(&mut out)?;
        } else if height > 0 {
            // Leave the prompt below the last frame.
            ansi::cursor_to(&mut out, 0, height - 1)?;
            out.write_str("\r\n");
        }
        if self.hide_cursor {
            ansi::cursor_show(&mut out)?;
        }

        let written = out.flush_to(&mut **self.output.borrow_mut());
        let disabled = self.input.borrow_mut().disable();
        written?;
        disabled?;
        tracing::debug!("render root torn down");
        Ok(())
    }

    /// Lay out, paint, diff and emit one frame.
    ///
    /// A panic anywhere in layout, paint or diff leaves the front buffer as
    /// it was and comes back as [`Error::FramePanicked`].
    fn draw_frame(&self, node: &Node, width: u16, height: u16) -> Result<()> {
        let mut frames = self.frames.borrow_mut();
        if frames.resize(width, height) {
            tracing::debug!(width, height, "resized");
        }

        let drawn = catch_unwind(AssertUnwindSafe(|| {
            let layout = compute_layout(node, width, height, true);
            paint(frames.begin_frame(), node, &layout);
            let full = frames.needs_full_redraw();
            (frames.swap(), full)
        }));
        let (patches, full) = match drawn {
            Ok(drawn) => drawn,
            Err(payload) => {
                reset_titan_arrays();
                return Err(Error::FramePanicked(panic_message(payload.as_ref())));
            }
        };

        if patches.is_empty() && !full {
            return Ok(());
        }

        let mut out = self.scratch.borrow_mut();
        out.clear();
        let bytes = match self.emit(&mut out, &patches, full) {
            Ok(bytes) => bytes,
            Err(err) => {
                // The frame never fully arrived: keep the previous one.
                out.clear();
                frames.rollback();
                return Err(err);
            }
        };

        tracing::trace!(frame = frames.frame_count(), patches = patches.len(), bytes, full, "frame");
        Ok(())
    }

    /// Encode `patches` into `out` and flush them to the sink. Returns the
    /// number of bytes written.
    fn emit(&self, out: &mut OutputBuffer, patches: &[Patch], full: bool) -> Result<usize> {
        if self.synchronized_output {
            ansi::begin_sync(&mut *out)?;
        }
        if full {
            ansi::clear_screen(&mut *out)?;
        }
        write_patches(&mut *out, patches)?;
        if self.synchronized_output {
            ansi::end_sync(&mut *out)?;
        }
        let bytes = out.len();
        out.flush_to(&mut **self.output.borrow_mut())?;
        Ok(bytes)
    }
}

// =============================================================================
// Render Handle
// =============================================================================

/// Handle to a live render root.
///
/// Dropping it tears the root down like [`unmount`](Self::unmount), but
/// swallows errors.
pub struct RenderHandle {
    root: Rc<Root>,
    effect: Option<Effect>,
    component: WriteSignal<Component>,
    size: ReadSignal<(u16, u16)>,
    set_size: WriteSignal<(u16, u16)>,
    running: Arc<AtomicBool>,
}

impl RenderHandle {
    /// Replace the root component. The next frame renders the new one.
    pub fn rerender(&self, component: impl Fn() -> Node + 'static) {
        self.component.set(Rc::new(component));
    }

    /// Stop the event loop and stop producing frames.
    pub fn exit(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// A flag that can stop this root from another thread.
    pub fn exit_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Frames swapped so far.
    pub fn frame_count(&self) -> u64 {
        self.root.frames.borrow().frame_count()
    }

    /// Current size in cells.
    pub fn size(&self) -> (u16, u16) {
        self.size.get_untracked()
    }

    /// What is on screen now, as ANSI text.
    pub fn snapshot(&self) -> String {
        buffer_to_ansi(self.root.frames.borrow().front())
    }

    /// Ask the size provider again and redraw if the size changed.
    pub fn refresh_size(&self) -> Result<()> {
        let size = self
            .root
            .size
            .borrow_mut()
            .size()
            .map_err(|err| Error::Terminal(err.to_string()))?;
        self.resize(size.0, size.1);
        Ok(())
    }

    fn resize(&self, width: u16, height: u16) {
        if self.size.get_untracked() != (width, height) {
            self.set_size.set((width, height));
        }
    }

    /// Poll once for input and run deferred effects.
    ///
    /// Returns `Ok(false)` once the root stopped or its input source will
    /// never produce another event.
    pub fn tick(&self) -> Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }

        let event = self.root.input.borrow_mut().poll(self.root.poll_interval)?;
        let exhausted = match event {
            Some(event) => {
                self.dispatch(event);
                false
            }
            None => self.root.input.borrow().is_exhausted(),
        };

        signals::tick();
        Ok(self.is_running() && !exhausted)
    }

    /// Run the event loop until [`exit`](Self::exit), Ctrl+C, or the end of input.
    pub fn wait_until_exit(&self) -> Result<()> {
        while self.tick()? {}
        Ok(())
    }

    fn dispatch(&self, event: Event) {
        match &event {
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                return;
            }
            key if self.root.exit_on_ctrl_c && is_ctrl_c(key) => {
                tracing::debug!("ctrl+c");
                self.exit();
                return;
            }
            _ => {}
        }

        if let Some(on_input) = self.root.on_input.clone() {
            on_input(&event);
        }
    }

    /// Stop rendering, dispose the render effect and restore the terminal.
    pub fn unmount(mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        self.exit();
        if let Some(effect) = self.effect.take() {
            effect.dispose();
        }
        self.root.leave()
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            tracing::warn!(error = %err, "teardown failed");
        }
    }
}

impl std::fmt::Debug for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHandle")
            .field("size", &self.size())
            .field("frames", &self.frame_count())
            .field("running", &self.is_running())
            .finish()
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Mount `component` and draw its first frame.
///
/// Sets up the terminal (raw input, optional alternate screen, hidden
/// cursor), then creates the render effect. The first frame is written
/// before this returns.
pub fn render(component: impl Fn() -> Node + 'static, options: RenderOptions) -> Result<RenderHandle> {
    let RenderOptions {
        output,
        mut size,
        input,
        alternate_screen,
        exit_on_ctrl_c,
        hide_cursor,
        synchronized_output,
        poll_interval,
        on_error,
        on_input,
    } = options;

    let (width, height) = size.size().map_err(|err| Error::Terminal(err.to_string()))?;

    let root = Rc::new(Root {
        output: RefCell::new(output),
        size: RefCell::new(size),
        input: RefCell::new(input),
        frames: RefCell::new(DoubleBuffer::new(width, height)),
        scratch: RefCell::new(OutputBuffer::new()),
        alternate_screen,
        exit_on_ctrl_c,
        hide_cursor,
        synchronized_output,
        poll_interval,
        on_error,
        on_input,
        torn_down: Cell::new(false),
    });
    root.enter()?;

    let running = Arc::new(AtomicBool::new(true));
    let (component_read, component_write) = create_signal::<Component>(Rc::new(component));
    let (size_read, size_write) = create_signal((width, height));

    let boundary: ErrorHandler = {
        let root = root.clone();
        Rc::new(move |err: &Error| root.report(err))
    };

    let effect = {
        let root = root.clone();
        let running = running.clone();
        let size_read = size_read.clone();
        with_error_boundary(boundary, move || {
            create_effect(move || {
                let component = component_read.get();
                let (width, height) = size_read.get();
                if !running.load(Ordering::SeqCst) {
                    return;
                }

                // The component runs outside every RefCell borrow: it may
                // write signals or call back into the handle.
                let node = match catch_unwind(AssertUnwindSafe(|| component())) {
                    Ok(node) => node,
                    Err(payload) => {
                        root.report(&Error::FramePanicked(panic_message(payload.as_ref())));
                        return;
                    }
                };

                if let Err(err) = root.draw_frame(&node, width, height) {
                    root.report(&err);
                }
            })
        })
    };

    tracing::debug!(width, height, "render root mounted");

    Ok(RenderHandle {
        root,
        effect: Some(effect),
        component: component_write,
        size: size_read,
        set_size: size_write,
        running,
    })
}

/// Lay out, paint and serialise `node` once, `width` columns wide.
///
/// No terminal, no diffing: the height is whatever the content needs, rows
/// are joined with `\n` and trailing blanks are trimmed.
pub fn render_once(node: &Node, width: u16) -> String {
    let layout = compute_layout(node, width, 0, false);
    let mut buffer = CellBuffer::new(width, layout.rect().bottom());
    paint(&mut buffer, node, &layout);
    buffer_to_ansi(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::strip_ansi;
    use crate::pipeline::terminal::{FixedSize, ScriptedInput};
    use crate::primitives::{box_node, text};
    use crate::renderer::CaptureSink;
    use crate::types::BorderStyle;

    fn headless(width: u16, height: u16) -> (CaptureSink, FixedSize, RenderOptions) {
        let sink = CaptureSink::new();
        let size = FixedSize::new(width, height);
        let options = RenderOptions::headless(sink.clone(), size.clone());
        (sink, size, options)
    }

    #[test]
    fn test_render_once() {
        let ui = box_node()
            .border(BorderStyle::Rounded)
            .width(6)
            .child(text("hi"));
        assert_eq!(strip_ansi(&render_once(&ui, 20)), "╭────╮\n│hi  │\n╰────╯");
    }

    #[test]
    fn test_render_once_wraps_to_width() {
        let out = render_once(&text("aaa bbb"), 3);
        assert_eq!(strip_ansi(&out), "aaa\nbbb");
    }

    #[test]
    fn test_first_frame_is_full() {
        let (sink, _size, options) = headless(10, 2);
        let handle = render(|| text("hello"), options).unwrap();

        let out = sink.take();
        assert!(out.contains("\x1b[2J"));
        assert!(out.contains("\x1b[?2026h"));
        assert!(strip_ansi(&out).contains("hello"));
        assert_eq!(handle.frame_count(), 1);
        assert_eq!(strip_ansi(&handle.snapshot()), "hello\n");
    }

    #[test]
    fn test_exit_stops_frames() {
        let (sink, _size, options) = headless(10, 1);
        let (label, set_label) = create_signal("a");
        let handle = render(move || text(label.get()), options).unwrap();
        sink.take();

        handle.exit();
        set_label.set("b");
        assert!(sink.is_empty());
        assert!(!handle.tick().unwrap());
    }

    #[test]
    fn test_tick_stops_when_input_exhausted() {
        let (_sink, _size, options) = headless(4, 1);
        let handle = render(|| text("x"), options.with_input(ScriptedInput::new().key('q'))).unwrap();
        assert!(handle.tick().unwrap());
        assert!(!handle.tick().unwrap());
        // Exhausted input ends the loop but does not exit the root.
        assert!(handle.is_running());
    }

    #[test]
    fn test_drop_restores_terminal() {
        let (sink, _size, options) = headless(4, 1);
        let handle = render(|| text("x"), options).unwrap();
        sink.take();
        drop(handle);
        assert!(sink.contents().contains("\x1b[?25h"));
    }
}
