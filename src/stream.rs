//! Boundary contracts with the record store
//!
//! The store pushes *full snapshots* (never deltas) to every live subscriber.
//! Subscribing returns a [`Subscription`]; once it is disposed (explicitly or
//! by dropping it) the callback is never invoked again.
//!
//! Everything here is single-threaded: callbacks run synchronously on the
//! thread that publishes.

use crate::draft::NewSubmission;
use crate::record::{ClassRecord, RecordId, SubmissionRecord};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Callback receiving a full snapshot
pub type SnapshotCallback<T> = Box<dyn FnMut(&[T])>;

/// Errors surfaced by a write sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// Live feed of all submissions, newest first
pub trait RecordStream {
    fn subscribe_records(&self, on_change: SnapshotCallback<SubmissionRecord>) -> Subscription;
}

/// Live feed of all class records
pub trait ClassStream {
    fn subscribe_classes(&self, on_change: SnapshotCallback<ClassRecord>) -> Subscription;
}

/// Write path for new submissions and class records
pub trait SubmissionSink {
    /// Persist a validated submission; the store assigns id and timestamp
    fn create_submission(&self, payload: &NewSubmission) -> Result<RecordId, StoreError>;

    /// Create or replace the class keyed by `code`
    fn upsert_class(&self, code: &str, name: &str) -> Result<(), StoreError>;
}

/// Disposer for a registered callback
///
/// Dropping the handle unsubscribes as well.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to tear down
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// Stop receiving callbacks
    pub fn unsubscribe(mut self) {
        self.dispose_now();
    }

    fn dispose_now(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

struct Listener<T> {
    id: u64,
    // Taken out while the callback runs so it may re-enter the broadcast
    callback: Option<SnapshotCallback<T>>,
}

struct Listeners<T> {
    next_id: u64,
    slots: Vec<Listener<T>>,
}

/// Fan-out of snapshots to registered callbacks
///
/// Callbacks may subscribe, unsubscribe or trigger another publish while
/// running; a callback that is currently executing is skipped by nested
/// publishes instead of being re-entered.
pub struct Broadcast<T> {
    listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T: 'static> Default for Broadcast<T> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Broadcast<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it stays live until the subscription is disposed
    pub fn subscribe(&self, callback: SnapshotCallback<T>) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.slots.push(Listener {
                id,
                callback: Some(callback),
            });
            id
        };
        tracing::trace!(listener = id, "subscribed");

        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().slots.retain(|l| l.id != id);
                tracing::trace!(listener = id, "unsubscribed");
            }
        })
    }

    /// Number of live subscribers
    pub fn len(&self) -> usize {
        self.listeners.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `snapshot` to every live subscriber, in registration order
    pub fn publish(&self, snapshot: &[T]) {
        let ids: Vec<u64> = self.listeners.borrow().slots.iter().map(|l| l.id).collect();
        for id in ids {
            let callback = {
                let mut listeners = self.listeners.borrow_mut();
                listeners
                    .slots
                    .iter_mut()
                    .find(|l| l.id == id)
                    .and_then(|l| l.callback.take())
            };
            // Unsubscribed earlier in this round, or already running
            let Some(mut callback) = callback else {
                continue;
            };

            callback(snapshot);

            let mut listeners = self.listeners.borrow_mut();
            if let Some(slot) = listeners.slots.iter_mut().find(|l| l.id == id) {
                slot.callback = Some(callback);
            }
        }
    }

    /// Deliver `snapshot` to one freshly registered subscriber only
    pub(crate) fn publish_to_latest(&self, snapshot: &[T]) {
        let last = self.listeners.borrow().slots.last().map(|l| l.id);
        let Some(id) = last else {
            return;
        };
        let callback = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .slots
                .iter_mut()
                .find(|l| l.id == id)
                .and_then(|l| l.callback.take())
        };
        if let Some(mut callback) = callback {
            callback(snapshot);
            let mut listeners = self.listeners.borrow_mut();
            if let Some(slot) = listeners.slots.iter_mut().find(|l| l.id == id) {
                slot.callback = Some(callback);
            }
        }
    }
}
