//! Reactive signal — a mutable value with automatic change notification.
//!
//! [`Signal<T>`] is the fundamental reactive primitive. Writes are
//! equality-gated: setting a signal to a value equal to its current
//! value does not notify subscribers or mark the build dirty.
//! [`AnySignal<T>`] is the always-notify counterpart, for values that
//! either don't implement `PartialEq` or should re-trigger downstream
//! work even when the new value compares equal (e.g. "tick" counters,
//! externally-sourced frames).
//!
//! When read inside a tracking context, the dependency is automatically
//! recorded via [`super::context`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::context::{self, SignalId, SubscriberId};

/// A subscriber that receives notifications when a signal changes.
pub trait Subscriber {
    /// Called when a dependency signal has been modified.
    fn notify(&self);

    /// Return this subscriber's unique identifier.
    fn id(&self) -> SubscriberId;
}

struct SignalInner<T> {
    value: T,
    id: SignalId,
    subscribers: Vec<Weak<dyn Subscriber>>,
}

impl<T> SignalInner<T> {
    fn notify_subscribers(&mut self) {
        let to_notify: Vec<Rc<dyn Subscriber>> =
            self.subscribers.iter().filter_map(|w| w.upgrade()).collect();

        for sub in &to_notify {
            if !super::batch::queue_subscriber(sub) {
                sub.notify();
            }
        }

        self.subscribers.retain(|w| w.strong_count() > 0);
    }
}

/// A reactive signal holding a value of type `T`, gated by equality.
///
/// Signals are cheaply cloneable — cloning produces another handle
/// to the same underlying value. Changes to one handle are visible
/// through all clones. [`Signal::set`] and [`Signal::update`] compare
/// the new value against the old one and skip notification (and any
/// rebuild it would trigger) when they are equal.
///
/// # Examples
///
/// ```ignore
/// let count = Signal::new(0);
/// assert_eq!(count.get(), 0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// count.set(5); // no-op: equal to current value, no notification
/// ```
pub struct Signal<T>(Rc<RefCell<SignalInner<T>>>);

impl<T> Signal<T> {
    /// Create a new signal with the given initial value.
    #[must_use]
    pub fn new(value: T) -> Self
    where
        T: 'static,
    {
        let id = context::next_signal_id();
        let inner = Rc::new(RefCell::new(SignalInner {
            value,
            id,
            subscribers: Vec::new(),
        }));
        let weak = Rc::downgrade(&inner);
        context::register_signal(
            id,
            Box::new(move |sub| {
                if let Some(strong) = weak.upgrade() {
                    strong.borrow_mut().subscribers.push(sub);
                }
            }),
        );
        Signal(inner)
    }

    /// Get the signal's unique identifier.
    pub fn id(&self) -> SignalId {
        self.0.borrow().id
    }

    /// Read the value, recording a dependency in the active tracking context.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        let inner = self.0.borrow();
        context::record_read(inner.id);
        inner.value.clone()
    }

    /// Read the value without recording a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Borrow the value and apply a function, recording a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.0.borrow();
        context::record_read(inner.id);
        f(&inner.value)
    }

    /// Borrow the value and apply a function without recording a dependency.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.0.borrow();
        f(&inner.value)
    }

    /// Set a new value. Subscribers are notified only if the value
    /// differs from the current one (by `PartialEq`).
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        let changed = {
            let mut inner = self.0.borrow_mut();
            if inner.value == value {
                false
            } else {
                inner.value = value;
                true
            }
        };
        if changed {
            self.0.borrow_mut().notify_subscribers();
        }
    }

    /// Update the value in place via `f`. Subscribers are notified only
    /// if the value changed (by `PartialEq`), determined by snapshotting
    /// the value before and after the mutation.
    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: PartialEq + Clone,
    {
        let changed = {
            let mut inner = self.0.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            before != inner.value
        };
        if changed {
            self.0.borrow_mut().notify_subscribers();
        }
    }

    /// Register a subscriber to be notified when this signal changes.
    pub fn subscribe(&self, subscriber: Weak<dyn Subscriber>) {
        self.0.borrow_mut().subscribers.push(subscriber);
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal(Rc::clone(&self.0))
    }
}

/// A reactive signal that always notifies subscribers on write,
/// regardless of whether the new value equals the old one.
///
/// Use this for values without a meaningful `PartialEq` (closures,
/// externally-driven frame counters) or where repeated identical
/// writes must still trigger downstream re-evaluation.
///
/// # Examples
///
/// ```ignore
/// let tick = AnySignal::new(0);
/// tick.set(0); // still notifies, even though the value is unchanged
/// ```
pub struct AnySignal<T>(Rc<RefCell<SignalInner<T>>>);

impl<T> AnySignal<T> {
    /// Create a new always-notify signal with the given initial value.
    #[must_use]
    pub fn new(value: T) -> Self
    where
        T: 'static,
    {
        let id = context::next_signal_id();
        let inner = Rc::new(RefCell::new(SignalInner {
            value,
            id,
            subscribers: Vec::new(),
        }));
        let weak = Rc::downgrade(&inner);
        context::register_signal(
            id,
            Box::new(move |sub| {
                if let Some(strong) = weak.upgrade() {
                    strong.borrow_mut().subscribers.push(sub);
                }
            }),
        );
        AnySignal(inner)
    }

    /// Get the signal's unique identifier.
    pub fn id(&self) -> SignalId {
        self.0.borrow().id
    }

    /// Read the value, recording a dependency in the active tracking context.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        let inner = self.0.borrow();
        context::record_read(inner.id);
        inner.value.clone()
    }

    /// Read the value without recording a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Borrow the value and apply a function, recording a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let inner = self.0.borrow();
        context::record_read(inner.id);
        f(&inner.value)
    }

    /// Set a new value unconditionally and notify all subscribers.
    pub fn set(&self, value: T) {
        {
            self.0.borrow_mut().value = value;
        }
        self.0.borrow_mut().notify_subscribers();
    }

    /// Update the value in place and notify all subscribers unconditionally.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            f(&mut self.0.borrow_mut().value);
        }
        self.0.borrow_mut().notify_subscribers();
    }

    /// Register a subscriber to be notified when this signal changes.
    pub fn subscribe(&self, subscriber: Weak<dyn Subscriber>) {
        self.0.borrow_mut().subscribers.push(subscriber);
    }
}

impl<T> Clone for AnySignal<T> {
    fn clone(&self) -> Self {
        AnySignal(Rc::clone(&self.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Mock subscriber that counts notifications.
    struct MockSubscriber {
        sub_id: SubscriberId,
        count: Rc<Cell<u32>>,
    }

    impl MockSubscriber {
        fn new() -> (Rc<Self>, Rc<Cell<u32>>) {
            let count = Rc::new(Cell::new(0));
            let sub = Rc::new(Self {
                sub_id: context::next_subscriber_id(),
                count: Rc::clone(&count),
            });
            (sub, count)
        }
    }

    impl Subscriber for MockSubscriber {
        fn notify(&self) {
            self.count.set(self.count.get() + 1);
        }

        fn id(&self) -> SubscriberId {
            self.sub_id
        }
    }

    #[test]
    fn new_and_get_roundtrip() {
        let sig = Signal::new(42);
        assert_eq!(sig.get(), 42);
    }

    #[test]
    fn set_changes_value() {
        let sig = Signal::new(10);
        sig.set(20);
        assert_eq!(sig.get(), 20);
    }

    #[test]
    fn set_equal_value_does_not_notify() {
        let sig = Signal::new(10);
        let (sub, count) = MockSubscriber::new();
        sig.subscribe(Rc::downgrade(&sub) as Weak<dyn Subscriber>);

        sig.set(10); // equal to current value
        assert_eq!(count.get(), 0);

        sig.set(20);
        assert_eq!(count.get(), 1);

        sig.set(20); // equal again
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_notifies_only_on_real_change() {
        let sig = Signal::new(vec![1, 2, 3]);
        let (sub, count) = MockSubscriber::new();
        sig.subscribe(Rc::downgrade(&sub) as Weak<dyn Subscriber>);

        sig.update(|v| v.sort()); // already sorted, no change
        assert_eq!(count.get(), 0);

        sig.update(|v| v.push(4));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn with_borrows_without_clone() {
        let sig = Signal::new(String::from("hello"));
        let len = sig.with(|s| s.len());
        assert_eq!(len, 5);
    }

    #[test]
    fn get_untracked_returns_value() {
        let sig = Signal::new(99);
        assert_eq!(sig.get_untracked(), 99);
    }

    #[test]
    fn clone_shares_state() {
        let sig = Signal::new(1);
        let sig2 = sig.clone();
        sig.set(2);
        assert_eq!(sig2.get(), 2);
    }

    #[test]
    fn id_is_unique_per_signal() {
        let a = Signal::new(0);
        let b = Signal::new(0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn get_inside_tracking_records_dependency() {
        let sig = Signal::new(5);
        let sub_id = context::next_subscriber_id();

        context::start_tracking(sub_id);
        let _ = sig.get();
        let deps = context::stop_tracking();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0], sig.id());
    }

    #[test]
    fn subscriber_receives_notification_on_set() {
        let sig = Signal::new(0);
        let (sub, count) = MockSubscriber::new();

        sig.subscribe(Rc::downgrade(&sub) as Weak<dyn Subscriber>);

        assert_eq!(count.get(), 0);
        sig.set(1);
        assert_eq!(count.get(), 1);
        sig.set(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn dead_subscriber_is_pruned() {
        let sig = Signal::new(0);
        let (sub, count) = MockSubscriber::new();

        sig.subscribe(Rc::downgrade(&sub) as Weak<dyn Subscriber>);
        sig.set(1);
        assert_eq!(count.get(), 1);

        drop(sub);

        sig.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn any_signal_always_notifies() {
        let sig = AnySignal::new(10);
        let (sub, count) = MockSubscriber::new();
        sig.subscribe(Rc::downgrade(&sub) as Weak<dyn Subscriber>);

        sig.set(10); // same value, still notifies
        assert_eq!(count.get(), 1);
        sig.set(10);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn any_signal_get_roundtrip() {
        let sig = AnySignal::new("a");
        assert_eq!(sig.get(), "a");
        sig.set("b");
        assert_eq!(sig.get(), "b");
    }
}
