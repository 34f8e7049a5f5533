//! Memos - cached derivations.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::runtime::{self, next_id, NodeId, Observer, ObserverScope, Source, Sources, Subscribers};

struct MemoInner<T> {
    id: NodeId,
    f: Box<dyn Fn() -> T>,
    value: RefCell<Option<T>>,
    stale: Cell<bool>,
    version: Cell<u64>,
    sources: Sources,
    subscribers: Subscribers,
}

impl<T: 'static> MemoInner<T> {
    /// Recompute if a dependency changed since the last read.
    fn refresh(self: &Rc<Self>) {
        if !self.stale.get() {
            return;
        }
        self.sources.clear(self.id);
        let value = {
            let observer: Rc<dyn Observer> = self.clone();
            let _scope = ObserverScope::enter(Some(observer));
            (self.f)()
        };
        *self.value.borrow_mut() = Some(value);
        self.stale.set(false);
        self.version.set(self.version.get() + 1);
    }

    fn track(self: &Rc<Self>) {
        let weak: Weak<MemoInner<T>> = Rc::downgrade(self);
        let source: Weak<dyn Source> = weak;
        runtime::track(self.id, source, &self.subscribers);
    }
}

impl<T: 'static> Source for MemoInner<T> {
    fn unsubscribe(&self, observer: NodeId) {
        self.subscribers.remove(observer);
    }
}

impl<T: 'static> Observer for MemoInner<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn add_source(&self, id: NodeId, source: Weak<dyn Source>) -> bool {
        self.sources.insert(id, source)
    }

    /// Mark stale and pass the change on. Recomputation waits for a read.
    fn notify(self: Rc<Self>) {
        if self.stale.replace(true) {
            return;
        }
        for subscriber in self.subscribers.collect() {
            subscriber.notify();
        }
    }
}

/// A derived, read-only signal with a cached value.
pub struct Memo<T: 'static> {
    inner: Rc<MemoInner<T>>,
}

impl<T: 'static> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> Memo<T> {
    /// Borrow the current value, recomputing first if stale. Tracks.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.refresh();
        self.inner.track();
        let value = self.inner.value.borrow();
        match value.as_ref() {
            Some(v) => f(v),
            // create_memo computes before returning, and a failed recompute keeps the old value.
            None => unreachable!("memo {} has no value", self.inner.id),
        }
    }

    /// Times the value has been (re)computed.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }
}

impl<T: Clone + 'static> Memo<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        runtime::untrack(|| self.get())
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value.borrow())
            .field("stale", &self.inner.stale.get())
            .finish()
    }
}

/// Create a memo. `f` runs once now and then lazily, on the first read after
/// one of its dependencies changed.
pub fn create_memo<T: 'static>(f: impl Fn() -> T + 'static) -> Memo<T> {
    let inner = Rc::new(MemoInner {
        id: next_id(),
        f: Box::new(f),
        value: RefCell::new(None),
        stale: Cell::new(true),
        version: Cell::new(0),
        sources: Sources::default(),
        subscribers: Subscribers::default(),
    });
    inner.refresh();
    Memo { inner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{batch, create_effect, create_signal};

    #[test]
    fn test_memo_initial_value() {
        let (x, _set_x) = create_signal(2);
        let doubled = create_memo(move || x.get() * 2);
        assert_eq!(doubled.get(), 4);
        assert_eq!(doubled.version(), 1);
    }

    #[test]
    fn test_memo_is_lazy() {
        let (x, set_x) = create_signal(1);
        let computes = Rc::new(Cell::new(0));
        let c = computes.clone();
        let memo = create_memo(move || {
            c.set(c.get() + 1);
            x.get() + 1
        });
        assert_eq!(computes.get(), 1);

        set_x.set(5);
        set_x.set(6);
        assert_eq!(computes.get(), 1, "no read, no recompute");

        assert_eq!(memo.get(), 7);
        assert_eq!(memo.get(), 7);
        assert_eq!(computes.get(), 2);
    }

    #[test]
    fn test_memo_drives_effect() {
        let (x, set_x) = create_signal(1);
        let squared = create_memo(move || x.get() * x.get());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let m = squared.clone();
        let _e = create_effect(move || log.borrow_mut().push(m.get()));

        set_x.set(3);
        batch(|| {
            set_x.set(4);
            set_x.set(5);
        });
        assert_eq!(*seen.borrow(), vec![1, 9, 25]);
    }

    #[test]
    fn test_memo_chain() {
        let (x, set_x) = create_signal(1);
        let plus_one = create_memo(move || x.get() + 1);
        let p = plus_one.clone();
        let times_ten = create_memo(move || p.get() * 10);

        assert_eq!(times_ten.get(), 20);
        set_x.set(4);
        assert_eq!(times_ten.get(), 50);
        assert_eq!(plus_one.get(), 5);
    }

    #[test]
    fn test_memo_untracked_read() {
        let (x, set_x) = create_signal(1);
        let memo = create_memo(move || x.get());
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let m = memo.clone();
        let _e = create_effect(move || {
            m.get_untracked();
            r.set(r.get() + 1);
        });

        set_x.set(2);
        assert_eq!(runs.get(), 1);
        assert_eq!(memo.get(), 2);
    }
}
