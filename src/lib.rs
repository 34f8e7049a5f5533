//! # tessel
//!
//! Reactive rendering core for terminal UIs.
//!
//! ## Architecture
//!
//! A UI is a component: a closure that reads signals and returns a [`Node`]
//! tree. The render loop runs the component inside one effect, so any signal
//! write produces a new frame:
//!
//! ```text
//! signals → component() → Node tree → TITAN layout → paint → diff → ANSI
//! ```
//!
//! Frames are double-buffered and diffed inside a damage rectangle, so only
//! changed cells reach the terminal.
//!
//! ## Modules
//!
//! - [`signals`] - Signals, effects, memos, batching
//! - [`primitives`] - `Node` and its builders (`box_node`, `text`)
//! - [`layout`] - Integer flexbox layout over the cell grid, text measurement
//! - [`renderer`] - Cells, buffers, diffing, ANSI output
//! - [`pipeline`] - `render`, `render_once`, terminal collaborators
//! - [`types`] - Colors, attributes, dimensions, flex enums
//!
//! ## Example
//!
//! ```
//! use tessel::{box_node, render_once, text, BorderStyle};
//!
//! let ui = box_node()
//!     .border(BorderStyle::Single)
//!     .width(7)
//!     .child(text("hello"));
//!
//! let out = render_once(&ui, 40);
//! assert!(out.contains("hello"));
//! ```

pub mod error;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod signals;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use signals::{
    batch, create_effect, create_memo, create_signal, has_deferred, tick, untrack,
    with_error_boundary, Effect, Memo, ReadSignal, WriteSignal,
};

pub use primitives::{box_node, custom, text, Extra, Node, NodeKind, Props};

pub use layout::{compute_layout, string_width, strip_ansi, truncate_text, wrap_text, LayoutNode};

pub use renderer::{
    buffer_to_ansi, patches_to_ansi, BufferPool, CaptureSink, Cell, CellBuffer, DoubleBuffer,
    OutputBuffer, Patch, Style, Symbol,
};

pub use pipeline::{
    render, render_once, FixedSize, InputSource, RenderHandle, RenderOptions, ScriptedInput,
    SizeProvider,
};
