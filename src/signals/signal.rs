//! Signals - reactive value cells.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::runtime::{self, next_id, NodeId, Source, Subscribers};

struct SignalInner<T> {
    id: NodeId,
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: Subscribers,
}

impl<T: 'static> SignalInner<T> {
    fn track(self: &Rc<Self>) {
        let weak: Weak<SignalInner<T>> = Rc::downgrade(self);
        let source: Weak<dyn Source> = weak;
        runtime::track(self.id, source, &self.subscribers);
    }

    /// Bump the version and schedule every subscriber.
    fn changed(&self) {
        self.version.set(self.version.get() + 1);
        for subscriber in self.subscribers.collect() {
            subscriber.notify();
        }
        runtime::flush_if_idle();
    }
}

impl<T: 'static> Source for SignalInner<T> {
    fn unsubscribe(&self, observer: NodeId) {
        self.subscribers.remove(observer);
    }
}

/// Read half of a signal.
pub struct ReadSignal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

/// Write half of a signal.
pub struct WriteSignal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> ReadSignal<T> {
    /// Borrow the value. Inside a tracking scope this subscribes the caller.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.track();
        f(&self.inner.value.borrow())
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Incremented on every write.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<T: Clone + 'static> ReadSignal<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: 'static> WriteSignal<T> {
    /// Replace the value and schedule dependents.
    ///
    /// There is no equality check: every write reschedules.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.changed();
    }

    /// Mutate in place and schedule dependents.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.inner.changed();
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSignal")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: 'static> std::fmt::Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSignal").field("id", &self.inner.id).finish()
    }
}

/// Create a signal, returning its read and write halves.
pub fn create_signal<T: 'static>(initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
    let inner = Rc::new(SignalInner {
        id: next_id(),
        value: RefCell::new(initial),
        version: Cell::new(0),
        subscribers: Subscribers::default(),
    });
    (ReadSignal { inner: inner.clone() }, WriteSignal { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::create_effect;

    #[test]
    fn test_signal_get_set() {
        let (read, write) = create_signal(10);
        assert_eq!(read.get(), 10);
        write.set(20);
        assert_eq!(read.get(), 20);
        write.update(|v| *v += 1);
        assert_eq!(read.get(), 21);
    }

    #[test]
    fn test_signal_version_bumps_on_every_write() {
        let (read, write) = create_signal("a");
        assert_eq!(read.version(), 0);
        write.set("a");
        write.set("a");
        assert_eq!(read.version(), 2);
    }

    #[test]
    fn test_equal_write_still_reschedules() {
        let (read, write) = create_signal(1);
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let _e = create_effect(move || {
            read.get();
            r.set(r.get() + 1);
        });
        write.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_read_outside_scope_does_not_subscribe() {
        let (read, _write) = create_signal(0);
        read.get();
        assert_eq!(read.subscriber_count(), 0);

        let r = read.clone();
        let effect = create_effect(move || {
            r.get();
            r.get();
        });
        assert_eq!(read.subscriber_count(), 1);
        assert_eq!(effect.dependency_count(), 1);

        effect.dispose();
        assert_eq!(read.subscriber_count(), 0);
    }

    #[test]
    fn test_with_borrows() {
        let (read, write) = create_signal(vec![1, 2, 3]);
        assert_eq!(read.with(|v| v.len()), 3);
        write.update(|v| v.push(4));
        assert_eq!(read.with_untracked(|v| v.iter().sum::<i32>()), 10);
    }
}
