//! Signals - Fine-grained reactive state
//!
//! The reactive graph that drives every frame. Three primitives:
//!
//! - [`create_signal`]: a value cell. Reads inside a tracking scope subscribe
//!   the reader; writes bump the version and schedule subscribers.
//! - [`create_effect`]: a computation that runs immediately, records exactly the
//!   sources it read, and re-runs when any of them change.
//! - [`create_memo`]: a cached derivation, recomputed lazily on the first read
//!   after a dependency changed.
//!
//! plus [`batch`] (one transaction boundary, nestable) and [`untrack`].
//!
//! # Architecture
//!
//! ```text
//! write ──► subscribers.notify() ──► pending queue (first-dirtied order)
//!                                         │
//!            batch depth == 0 ────────────┴──► flush: run each effect once
//! ```
//!
//! The runtime is a thread-local scheduler with one "active observer" slot.
//! Nothing here is `Send`: the graph is single-threaded and cooperative.
//!
//! An effect whose own write would re-trigger itself (or an effect that is
//! still running further up the stack) is not re-entered. The re-run is
//! deferred until the next [`tick`].
//!
//! Writes always reschedule, even when the new value equals the old one.
//! Effects must therefore be idempotent.
//!
//! # Example
//!
//! ```
//! use tessel::signals::{batch, create_effect, create_signal};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let (count, set_count) = create_signal(1);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = seen.clone();
//! let _effect = create_effect(move || log.borrow_mut().push(count.get()));
//!
//! batch(|| {
//!     set_count.set(2);
//!     set_count.set(3);
//! });
//!
//! assert_eq!(*seen.borrow(), vec![1, 3]);
//! ```

mod effect;
mod memo;
mod runtime;
mod signal;

pub use effect::{create_effect, Effect};
pub use memo::{create_memo, Memo};
pub use runtime::{batch, has_deferred, tick, untrack, with_error_boundary, ErrorHandler};
pub use signal::{create_signal, ReadSignal, WriteSignal};
