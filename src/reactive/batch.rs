//! Batched updates for coalescing multiple signal changes.
//!
//! The [`batch`] function groups signal changes so that subscribers
//! are only notified once, after all changes complete. This avoids
//! redundant re-evaluations when multiple signals change together.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::context::SubscriberId;
use super::signal::Subscriber;

thread_local! {
    /// Nesting depth of batch operations.
    static BATCH_DEPTH: Cell<u32> = const { Cell::new(0) };
    /// Pending subscribers to notify after outermost batch completes.
    static PENDING: RefCell<Vec<Rc<dyn Subscriber>>> = const { RefCell::new(Vec::new()) };
    /// Set of subscriber IDs already queued (for deduplication).
    static PENDING_IDS: RefCell<HashSet<SubscriberId>> = RefCell::new(HashSet::new());
}

/// Check if we are currently inside a batch.
pub fn is_batching() -> bool {
    BATCH_DEPTH.with(|d| d.get() > 0)
}

/// Queue a subscriber for notification after the current batch completes.
///
/// If we are not in a batch, this returns `false` and the caller
/// should notify immediately. If we are in a batch, the subscriber
/// is queued and this returns `true`.
pub fn queue_subscriber(subscriber: &Rc<dyn Subscriber>) -> bool {
    if !is_batching() {
        return false;
    }

    let id = subscriber.id();
    PENDING_IDS.with(|ids| {
        let mut ids = ids.borrow_mut();
        if ids.insert(id) {
            PENDING.with(|pending| {
                pending.borrow_mut().push(Rc::clone(subscriber));
            });
        }
    });

    true
}

/// Run a closure with batched signal notifications.
///
/// All signal changes within the closure are batched — subscribers
/// are only notified once after the closure returns. Batches can
/// be nested; notifications only fire after the outermost batch.
///
/// # Examples
///
/// ```ignore
/// let a = Signal::new(0);
/// let b = Signal::new(0);
///
/// batch(|| {
///     a.set(1);
///     b.set(2);
///     // Effects are NOT triggered yet.
/// });
/// // Effects fire once here, seeing a=1 and b=2.
/// ```
pub fn batch(f: impl FnOnce()) {
    BATCH_DEPTH.with(|d| d.set(d.get() + 1));

    f();

    BATCH_DEPTH.with(|d| {
        let depth = d.get().saturating_sub(1);
        d.set(depth);

        if depth == 0 {
            flush_pending();
        }
    });
}

/// Flush all pending subscribers.
fn flush_pending() {
    let subscribers: Vec<Rc<dyn Subscriber>> =
        PENDING.with(|pending| pending.borrow_mut().drain(..).collect());

    PENDING_IDS.with(|ids| ids.borrow_mut().clear());

    for sub in &subscribers {
        sub.notify();
    }
}
