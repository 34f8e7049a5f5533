//! Terminal renderer - the "blind" output layer.
//!
//! The renderer knows only about cells. It doesn't understand components,
//! layout, or reactivity. It takes painted [`CellBuffer`]s and turns the
//! difference between frames into ANSI escape sequences.
//!
//! # Pieces
//!
//! - [`CellBuffer`] - flat grid of [`Cell`]s with damage tracking and
//!   wide-character pairing
//! - [`DoubleBuffer`] - front/back pair; `swap()` yields the [`Patch`] list
//! - [`BufferPool`] - buffers recycled by size
//! - [`output`] - patch and buffer serialisation with minimal SGR traffic

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod double_buffer;
pub mod output;
pub mod pool;

pub use buffer::{CellBuffer, Patch};
pub use cell::{Cell, Style, Symbol};
pub use double_buffer::DoubleBuffer;
pub use output::{
    buffer_to_ansi, patches_to_ansi, write_buffer, write_patches, CaptureSink, OutputBuffer,
    StatefulCellRenderer,
};
pub use pool::BufferPool;
