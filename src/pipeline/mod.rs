//! Render Pipeline
//!
//! Connects components to the terminal.
//!
//! # Pipeline Architecture
//!
//! ```text
//! component() → Node tree → compute_layout → paint → DoubleBuffer::swap → ANSI → sink
//! ```
//!
//! ## Data Flow
//!
//! 1. **component** - A closure returning a [`Node`](crate::primitives::Node);
//!    every signal it reads becomes a dependency of the frame
//! 2. **layout** - TITAN assigns each node an absolute cell rectangle
//! 3. **paint** - Depth-first fill of the back buffer
//! 4. **swap** - Diff against the front buffer inside the damaged region
//! 5. **emit** - Patches become cursor moves and SGR runs, written in one flush
//!
//! ## Key Design Principles
//!
//! - **One effect per root**: only the render effect touches the buffers and the sink
//! - **Injected terminal**: output, size and input are traits, so the whole loop
//!   runs headless in tests
//! - **Failures skip frames**: a failed frame is reported and the last good
//!   frame stays on screen

pub mod mount;
pub mod options;
pub mod paint;
pub mod terminal;

pub use mount::{render, render_once, RenderHandle};
pub use options::{ErrorCallback, InputCallback, RenderOptions};
pub use paint::paint;
pub use terminal::{
    is_ctrl_c, CrosstermInput, CrosstermSize, FixedSize, InputSource, ScriptedInput, SizeProvider,
};
