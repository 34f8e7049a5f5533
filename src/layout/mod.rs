//! Layout Module
//!
//! Integer flexbox layout for a terminal cell grid (TITAN).
//!
//! # Architecture
//!
//! [`compute_layout`] flattens the node tree into parallel working arrays in
//! breadth-first order, then:
//!
//! 1. **Measure** (leaf → root): intrinsic border-box size of every node.
//!    Text measures its display width; percentages contribute nothing yet.
//! 2. **Distribute** (root → leaf): each parent shares its main axis among
//!    its children by grow/shrink, clamps to min/max, rounds with the
//!    largest-remainder method, then aligns on the cross axis and wraps
//!    into lines when asked.
//!
//! The result is a [`LayoutNode`] tree with absolute cell coordinates.
//! Identical input always yields an identical tree.
//!
//! # Example
//!
//! ```
//! use tessel::layout::compute_layout;
//! use tessel::primitives::box_node;
//!
//! let root = box_node()
//!     .row()
//!     .width(10)
//!     .height(1)
//!     .child(box_node().flex_grow(1.0))
//!     .child(box_node().flex_grow(2.0));
//!
//! let layout = compute_layout(&root, 80, 24, true);
//! assert_eq!(layout.children[0].width, 3);
//! assert_eq!(layout.children[1].width, 7);
//! ```

pub mod text_measure;
mod titan;
mod types;

pub use text_measure::{
    measure_text_height, string_width, strip_ansi, truncate_text, wrap_text,
};
pub use titan::{compute_layout, reset_titan_arrays};
pub use types::LayoutNode;
