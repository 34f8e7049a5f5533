//! Primitives - the node tree the renderer consumes.
//!
//! - [`box_node`] - Container with flexbox layout, borders, and background
//! - [`text`] - Text leaf with styling, wrapping and alignment
//! - [`custom`] - Component-tagged container; extra data passes through
//!
//! # Architecture
//!
//! A component is a function returning a [`Node`]. The render loop calls it
//! inside an effect, so every signal it reads becomes a dependency of the
//! frame. The node tree itself is plain data: built, laid out, painted,
//! dropped.
//!
//! ```ignore
//! let (count, set_count) = create_signal(0);
//! render(move || text(format!("count: {}", count.get())).bold(), options)?;
//! ```

mod node;
mod types;

pub use node::{box_node, custom, text, Node, NodeKind};
pub use types::{Extra, Props};
