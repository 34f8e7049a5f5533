//! Effects - computations that re-run when what they read changes.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::error::{panic_message, Error};

use super::runtime::{
    self, current_boundary, next_id, ErrorHandler, NodeId, Observer, ObserverScope, RunningGuard,
    Source, Sources,
};

pub(crate) struct EffectInner {
    id: NodeId,
    f: RefCell<Option<Box<dyn FnMut()>>>,
    sources: Sources,
    disabled: Cell<bool>,
    disposed: Cell<bool>,
    runs: Cell<u64>,
    boundary: Option<ErrorHandler>,
}

impl EffectInner {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.disabled.get() && !self.disposed.get()
    }

    fn fail(&self, message: String) {
        self.disabled.set(true);
        self.sources.clear(self.id);
        runtime::unregister_effect(self.id);

        tracing::error!(effect = self.id, %message, "effect panicked; disabled");
        let err = Error::EffectPanicked { effect: self.id, message };
        if let Some(handler) = &self.boundary {
            handler(&err);
        }
    }
}

impl Observer for EffectInner {
    fn id(&self) -> NodeId {
        self.id
    }

    fn add_source(&self, id: NodeId, source: Weak<dyn Source>) -> bool {
        self.sources.insert(id, source)
    }

    fn notify(self: Rc<Self>) {
        runtime::schedule(self);
    }
}

/// Run one effect: drop last run's dependencies, then track this run's.
pub(crate) fn run(effect: &Rc<EffectInner>) {
    if !effect.is_active() {
        return;
    }

    // Already executing further up the stack; the scheduler defers those, so
    // this only happens when the closure was taken by `dispose`.
    let Ok(mut slot) = effect.f.try_borrow_mut() else {
        return;
    };
    let Some(f) = slot.as_mut() else {
        return;
    };

    effect.sources.clear(effect.id);
    let result = {
        let _running = RunningGuard::enter(effect.id);
        let observer: Rc<dyn Observer> = effect.clone();
        let _scope = ObserverScope::enter(Some(observer));
        catch_unwind(AssertUnwindSafe(|| f()))
    };
    drop(slot);
    effect.runs.set(effect.runs.get() + 1);

    if let Err(payload) = result {
        effect.fail(panic_message(payload.as_ref()));
    }
}

/// Handle to a running effect.
///
/// The runtime owns the effect until [`Effect::dispose`] is called or the
/// effect panics. Dropping the handle does not stop it.
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Runtime-unique id (matches `Error::EffectPanicked::effect`).
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Stop the effect and release its closure.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.sources.clear(self.inner.id);
        if let Ok(mut slot) = self.inner.f.try_borrow_mut() {
            slot.take();
        }
        runtime::unregister_effect(self.inner.id);
    }

    /// True once the effect has panicked.
    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// How many times the closure has been invoked.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    /// Number of sources read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.sources.len()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("runs", &self.inner.runs.get())
            .field("disabled", &self.inner.disabled.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Run `f` now inside a tracking scope, and again whenever anything it read changes.
///
/// A panic inside `f` is caught. The effect is then disabled permanently and
/// the error goes to the enclosing [`with_error_boundary`](super::with_error_boundary)
/// handler, if there is one.
pub fn create_effect(f: impl FnMut() + 'static) -> Effect {
    let inner = Rc::new(EffectInner {
        id: next_id(),
        f: RefCell::new(Some(Box::new(f))),
        sources: Sources::default(),
        disabled: Cell::new(false),
        disposed: Cell::new(false),
        runs: Cell::new(0),
        boundary: current_boundary(),
    });
    runtime::register_effect(inner.clone());
    run(&inner);
    runtime::flush_if_idle();
    Effect { inner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{batch, create_signal, tick, untrack, with_error_boundary};

    #[test]
    fn test_effect_runs_immediately() {
        let (read, _write) = create_signal(5);
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let effect = create_effect(move || s.set(read.get()));
        assert_eq!(seen.get(), 5);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn test_effect_reruns_per_write() {
        let (x, set_x) = create_signal(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let _e = create_effect(move || log.borrow_mut().push(x.get()));

        set_x.set(2);
        set_x.set(3);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_batch_coalesces() {
        let (x, set_x) = create_signal(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let _e = create_effect(move || log.borrow_mut().push(x.get()));

        batch(|| {
            set_x.set(2);
            set_x.set(3);
        });
        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn test_nested_batch_flushes_at_outermost() {
        let (x, set_x) = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let _e = create_effect(move || {
            x.get();
            r.set(r.get() + 1);
        });

        batch(|| {
            set_x.set(1);
            batch(|| set_x.set(2));
            assert_eq!(runs.get(), 1, "inner batch must not flush");
            set_x.set(3);
        });
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_batch_runs_in_first_dirtied_order() {
        let (a, set_a) = create_signal(0);
        let (b, set_b) = create_signal(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let _ea = create_effect(move || {
            a.get();
            o.borrow_mut().push("a");
        });
        let o = order.clone();
        let _eb = create_effect(move || {
            b.get();
            o.borrow_mut().push("b");
        });
        order.borrow_mut().clear();

        batch(|| {
            set_b.set(1);
            set_a.set(1);
            set_b.set(2);
        });
        assert_eq!(*order.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_dynamic_dependencies_dropped() {
        let (flag, set_flag) = create_signal(true);
        let (left, set_left) = create_signal(0);
        let (right, set_right) = create_signal(0);
        let runs = Rc::new(Cell::new(0));

        let r = runs.clone();
        let effect = create_effect(move || {
            r.set(r.get() + 1);
            if flag.get() { left.get() } else { right.get() };
        });
        assert_eq!(effect.dependency_count(), 2);

        set_flag.set(false);
        assert_eq!(runs.get(), 2);

        // `left` is no longer read, so writing it does nothing.
        set_left.set(10);
        assert_eq!(runs.get(), 2);

        set_right.set(10);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_untrack_creates_no_dependency() {
        let (x, set_x) = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let effect = create_effect(move || {
            untrack(|| x.get());
            r.set(r.get() + 1);
        });
        assert_eq!(effect.dependency_count(), 0);

        set_x.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_dispose_stops_reruns() {
        let (x, set_x) = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let effect = create_effect(move || {
            x.get();
            r.set(r.get() + 1);
        });

        effect.dispose();
        assert!(effect.is_disposed());
        set_x.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_panic_disables_and_reports() {
        let (x, set_x) = create_signal(0);
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = reported.clone();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();

        let effect = with_error_boundary(
            Rc::new(move |err: &Error| sink.borrow_mut().push(err.to_string())),
            || {
                create_effect(move || {
                    r.set(r.get() + 1);
                    if x.get() == 1 {
                        panic!("bad value");
                    }
                })
            },
        );

        set_x.set(1);
        assert!(effect.is_disabled());
        assert_eq!(reported.borrow().len(), 1);
        assert!(reported.borrow()[0].contains("bad value"));

        // No retry, no error storm.
        set_x.set(1);
        set_x.set(2);
        assert_eq!(runs.get(), 2);
        assert_eq!(reported.borrow().len(), 1);
    }

    #[test]
    fn test_self_retrigger_is_deferred() {
        let (x, set_x) = create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let _e = create_effect(move || {
            let v = x.get();
            log.borrow_mut().push(v);
            if v < 3 {
                set_x.set(v + 1);
            }
        });

        // The write inside the effect does not recurse.
        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(tick(), 1);
        assert_eq!(*seen.borrow(), vec![0, 1]);
        tick();
        tick();
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
        assert_eq!(tick(), 0);
    }

    #[test]
    fn test_effect_writes_trigger_other_effects() {
        let (a, set_a) = create_signal(1);
        let (b, set_b) = create_signal(0);
        let seen = Rc::new(Cell::new(0));

        let _copy = create_effect(move || set_b.set(a.get() * 10));
        let s = seen.clone();
        let _read = create_effect(move || s.set(b.get()));
        assert_eq!(seen.get(), 10);

        set_a.set(4);
        assert_eq!(seen.get(), 40);
    }
}
