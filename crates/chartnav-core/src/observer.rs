#![forbid(unsafe_code)]

//! Observer registry: the single fan-out point for state updates.
//!
//! # Design
//!
//! Observers are held as shared handles (`Rc<RefCell<dyn Observer<S>>>`) so
//! the owner can keep a typed handle to the same observer (to toggle a mode,
//! read a buffer) while the registry notifies it. Notification order is
//! registration order.
//!
//! # Invariants
//!
//! - Every observer sees the states of one registry in the order they were
//!   notified. A `notify` issued while a pass is running (an observer
//!   reacting to a state) is queued and delivered once the current pass has
//!   reached every observer.
//!
//! # Failure Modes
//!
//! - **Observer borrowed elsewhere**: an observer whose handle is borrowed
//!   outside the registry when its turn comes is skipped, with a `warn`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Receives every state produced by a subject.
pub trait Observer<S: ?Sized> {
    fn update(&mut self, state: &S);
}

/// Shared observer handle.
pub type ObserverHandle<S> = Rc<RefCell<dyn Observer<S>>>;

/// Identifies one registration; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered set of observers.
pub struct ObserverRegistry<S> {
    next_id: u64,
    observers: Vec<(SubscriptionId, ObserverHandle<S>)>,
    delivering: Cell<bool>,
    pending: RefCell<VecDeque<S>>,
}

impl<S> Default for ObserverRegistry<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
            delivering: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
        }
    }
}

impl<S> std::fmt::Debug for ObserverRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observer_count", &self.observers.len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

/// Clears the delivering flag when the outermost pass ends, even on unwind.
struct PassGuard<'a>(&'a Cell<bool>);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S> ObserverRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`; it is notified after every earlier registration.
    pub fn subscribe(&mut self, observer: ObserverHandle<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a registration. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Deliver `state` to every observer in registration order.
    ///
    /// Called from inside an update, the state is queued behind the one
    /// being delivered.
    pub fn notify(&self, state: &S)
    where
        S: Clone,
    {
        if self.delivering.replace(true) {
            self.pending.borrow_mut().push_back(state.clone());
            tracing::trace!("re-entrant update queued");
            return;
        }
        let _pass = PassGuard(&self.delivering);
        self.deliver(state);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(next) = next else {
                break;
            };
            self.deliver(&next);
        }
    }

    fn deliver(&self, state: &S) {
        for (id, observer) in &self.observers {
            match observer.try_borrow_mut() {
                Ok(mut obs) => obs.update(state),
                Err(_) => tracing::warn!(?id, "observer borrowed elsewhere; update skipped"),
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
