//! Reactive runtime: scheduler, active observer slot, error boundaries.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::{Rc, Weak};

use crate::error::Error;

use super::effect::{self, EffectInner};

pub(crate) type NodeId = u64;

/// Receives errors from effects created inside [`with_error_boundary`].
pub type ErrorHandler = Rc<dyn Fn(&Error)>;

// =============================================================================
// GRAPH EDGES
// =============================================================================

/// Anything that can be read inside a tracking scope.
pub(crate) trait Source {
    fn unsubscribe(&self, observer: NodeId);
}

/// Anything that records sources and reacts when they change.
pub(crate) trait Observer {
    fn id(&self) -> NodeId;

    /// Record a dependency. Returns false if it was already recorded this run.
    fn add_source(&self, id: NodeId, source: Weak<dyn Source>) -> bool;

    /// One of the recorded sources changed.
    fn notify(self: Rc<Self>);
}

/// Observers subscribed to a source.
#[derive(Default)]
pub(crate) struct Subscribers {
    list: RefCell<Vec<(NodeId, Weak<dyn Observer>)>>,
}

impl Subscribers {
    pub(crate) fn add(&self, id: NodeId, observer: Weak<dyn Observer>) {
        let mut list = self.list.borrow_mut();
        if !list.iter().any(|(existing, _)| *existing == id) {
            list.push((id, observer));
        }
    }

    pub(crate) fn remove(&self, id: NodeId) {
        self.list.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Live subscribers in subscription order. Dead entries are pruned.
    pub(crate) fn collect(&self) -> Vec<Rc<dyn Observer>> {
        let mut list = self.list.borrow_mut();
        list.retain(|(_, weak)| weak.strong_count() > 0);
        list.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }
}

/// Sources an observer read during its last run.
#[derive(Default)]
pub(crate) struct Sources {
    list: RefCell<Vec<(NodeId, Weak<dyn Source>)>>,
}

impl Sources {
    pub(crate) fn insert(&self, id: NodeId, source: Weak<dyn Source>) -> bool {
        let mut list = self.list.borrow_mut();
        if list.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        list.push((id, source));
        true
    }

    /// Drop every edge, unsubscribing `observer` from each source.
    pub(crate) fn clear(&self, observer: NodeId) {
        let old = std::mem::take(&mut *self.list.borrow_mut());
        for (_, weak) in old {
            if let Some(source) = weak.upgrade() {
                source.unsubscribe(observer);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

/// FIFO of effects with set semantics.
#[derive(Default)]
struct Queue {
    items: VecDeque<Rc<EffectInner>>,
    ids: HashSet<NodeId>,
}

impl Queue {
    fn push(&mut self, effect: Rc<EffectInner>) {
        if self.ids.insert(effect.id()) {
            self.items.push_back(effect);
        }
    }

    fn pop(&mut self) -> Option<Rc<EffectInner>> {
        let effect = self.items.pop_front()?;
        self.ids.remove(&effect.id());
        Some(effect)
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Default)]
struct Runtime {
    next_id: Cell<NodeId>,
    observer: RefCell<Option<Rc<dyn Observer>>>,
    batch_depth: Cell<u32>,
    pending: RefCell<Queue>,
    deferred: RefCell<Queue>,
    running: RefCell<Vec<NodeId>>,
    flushing: Cell<bool>,
    effects: RefCell<HashMap<NodeId, Rc<EffectInner>>>,
    boundaries: RefCell<Vec<ErrorHandler>>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime::default();
}

pub(crate) fn next_id() -> NodeId {
    RUNTIME.with(|rt| {
        let id = rt.next_id.get() + 1;
        rt.next_id.set(id);
        id
    })
}

// =============================================================================
// TRACKING
// =============================================================================

/// Swaps the active observer for the lifetime of the guard.
pub(crate) struct ObserverScope {
    prev: Option<Rc<dyn Observer>>,
}

impl ObserverScope {
    pub(crate) fn enter(observer: Option<Rc<dyn Observer>>) -> Self {
        let prev = RUNTIME.with(|rt| rt.observer.replace(observer));
        Self { prev }
    }
}

impl Drop for ObserverScope {
    fn drop(&mut self) {
        let prev = self.prev.take();
        RUNTIME.with(|rt| *rt.observer.borrow_mut() = prev);
    }
}

/// Register the active observer (if any) as a dependent of a source.
pub(crate) fn track(source_id: NodeId, source: Weak<dyn Source>, subscribers: &Subscribers) {
    let Some(observer) = RUNTIME.with(|rt| rt.observer.borrow().clone()) else {
        return;
    };
    if observer.add_source(source_id, source) {
        subscribers.add(observer.id(), Rc::downgrade(&observer));
    }
}

// =============================================================================
// SCHEDULING
// =============================================================================

/// Marks an effect currently executing.
pub(crate) struct RunningGuard;

impl RunningGuard {
    pub(crate) fn enter(id: NodeId) -> Self {
        RUNTIME.with(|rt| rt.running.borrow_mut().push(id));
        Self
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.running.borrow_mut().pop();
        });
    }
}

/// Queue a dirtied effect.
///
/// Effects on the running stack go to the deferred queue instead, so an
/// effect never re-enters itself or one of its ancestors.
pub(crate) fn schedule(effect: Rc<EffectInner>) {
    if !effect.is_active() {
        return;
    }
    RUNTIME.with(|rt| {
        if rt.running.borrow().contains(&effect.id()) {
            tracing::trace!(effect = effect.id(), "re-trigger while running; deferred");
            rt.deferred.borrow_mut().push(effect);
        } else {
            rt.pending.borrow_mut().push(effect);
        }
    });
}

/// Run pending effects unless a batch, a flush, or an effect is in progress.
pub(crate) fn flush_if_idle() {
    let idle = RUNTIME.with(|rt| {
        rt.batch_depth.get() == 0 && !rt.flushing.get() && rt.running.borrow().is_empty()
    });
    if idle {
        flush();
    }
}

struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| rt.flushing.set(false));
    }
}

fn flush() {
    RUNTIME.with(|rt| rt.flushing.set(true));
    let _guard = FlushGuard;

    let mut ran = 0usize;
    while let Some(next) = RUNTIME.with(|rt| rt.pending.borrow_mut().pop()) {
        effect::run(&next);
        ran += 1;
    }
    if ran > 0 {
        tracing::trace!(ran, "flushed effects");
    }
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get().saturating_sub(1)));
    }
}

/// Run `f` as one transaction.
///
/// Writes inside `f` (including nested batches) only mark effects dirty.
/// When the outermost batch ends, every dirtied effect runs exactly once,
/// in the order it was first marked.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
    let result = {
        let _guard = BatchGuard;
        f()
    };
    flush_if_idle();
    result
}

/// Run `f` without a tracking scope: reads inside create no dependencies.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _scope = ObserverScope::enter(None);
    f()
}

/// Run effects whose re-run was deferred because they re-triggered themselves.
///
/// Returns how many were promoted. The render loop calls this once per
/// iteration.
pub fn tick() -> usize {
    let promoted = RUNTIME.with(|rt| {
        let mut deferred = rt.deferred.borrow_mut();
        let mut pending = rt.pending.borrow_mut();
        let mut count = 0;
        while let Some(effect) = deferred.pop() {
            pending.push(effect);
            count += 1;
        }
        count
    });
    flush_if_idle();
    promoted
}

/// True when some effect is waiting for the next [`tick`].
pub fn has_deferred() -> bool {
    RUNTIME.with(|rt| !rt.deferred.borrow().is_empty())
}

// =============================================================================
// EFFECT OWNERSHIP
// =============================================================================

pub(crate) fn register_effect(effect: Rc<EffectInner>) {
    RUNTIME.with(|rt| rt.effects.borrow_mut().insert(effect.id(), effect));
}

pub(crate) fn unregister_effect(id: NodeId) {
    // The removed Rc may own the last reference to closures that hold signals.
    // Drop it outside the borrow.
    let removed = RUNTIME.with(|rt| rt.effects.borrow_mut().remove(&id));
    drop(removed);
}

// =============================================================================
// ERROR BOUNDARIES
// =============================================================================

struct BoundaryGuard;

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.boundaries.borrow_mut().pop();
        });
    }
}

/// Effects created inside `f` report their panics to `handler`.
///
/// The boundary is captured when the effect is created, so later re-runs
/// report to the same handler.
pub fn with_error_boundary<R>(handler: ErrorHandler, f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.boundaries.borrow_mut().push(handler));
    let _guard = BoundaryGuard;
    f()
}

pub(crate) fn current_boundary() -> Option<ErrorHandler> {
    RUNTIME.with(|rt| rt.boundaries.borrow().last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{create_effect, create_signal};

    #[test]
    fn test_next_id_monotonic() {
        let a = next_id();
        let b = next_id();
        assert!(b > a);
    }

    #[test]
    fn test_batch_returns_value() {
        assert_eq!(batch(|| 41 + 1), 42);
        assert_eq!(batch(|| batch(|| "nested")), "nested");
    }

    #[test]
    fn test_batch_depth_restored_after_panic() {
        let (read, write) = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let _e = create_effect(move || {
            read.get();
            r.set(r.get() + 1);
        });

        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch(|| panic!("inside batch"));
        }));
        assert!(caught.is_err());

        // Not stuck inside a batch: writes flush immediately again.
        write.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_tick_empty() {
        assert_eq!(tick(), 0);
        assert!(!has_deferred());
    }
}
