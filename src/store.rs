//! In-memory record store
//!
//! [`MemoryStore`] stands in for the live database behind the dashboard. It
//! assigns ids and creation timestamps, keeps class records keyed by code and
//! pushes full snapshots to every subscriber. New subscribers receive the
//! current snapshot immediately, the way a live query listener does.
//!
//! Cloning a `MemoryStore` yields another handle to the same data.

use crate::draft::NewSubmission;
use crate::record::{ClassRecord, RecordId, SubmissionRecord};
use crate::stream::{
    Broadcast, ClassStream, RecordStream, SnapshotCallback, StoreError, SubmissionSink,
    Subscription,
};
use chrono::{DateTime, Duration, Utc};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

#[derive(Default)]
struct Inner {
    records: RefCell<Vec<SubmissionRecord>>,
    classes: RefCell<BTreeMap<String, ClassRecord>>,
    record_hub: Broadcast<SubmissionRecord>,
    class_hub: Broadcast<ClassRecord>,
    failure: RefCell<Option<String>>,
    last_created: Cell<Option<DateTime<Utc>>>,
}

/// Shared, single-threaded record store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with existing submissions
    pub fn with_records(records: impl IntoIterator<Item = SubmissionRecord>) -> Self {
        let store = Self::new();
        store.insert_records(records);
        store
    }

    /// Add already-persisted submissions (ids and timestamps kept as given)
    pub fn insert_records(&self, records: impl IntoIterator<Item = SubmissionRecord>) {
        {
            let mut stored = self.inner.records.borrow_mut();
            stored.extend(records);
            sort_newest_first(&mut stored);
        }
        self.publish_records();
    }

    /// Add class records, replacing any with the same code
    pub fn insert_classes(&self, classes: impl IntoIterator<Item = ClassRecord>) {
        {
            let mut stored = self.inner.classes.borrow_mut();
            for class in classes {
                stored.insert(class.code.clone(), class);
            }
        }
        self.publish_classes();
    }

    /// Current submissions, newest first
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.inner.records.borrow().clone()
    }

    /// Current classes, ordered by code
    pub fn classes(&self) -> Vec<ClassRecord> {
        self.inner.classes.borrow().values().cloned().collect()
    }

    /// Make every subsequent write fail with `reason`, or restore writes with `None`
    pub fn fail_writes(&self, reason: Option<String>) {
        *self.inner.failure.borrow_mut() = reason;
    }

    /// Live subscriptions across both streams
    pub fn subscriber_count(&self) -> usize {
        self.inner.record_hub.len() + self.inner.class_hub.len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match self.inner.failure.borrow().as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    // Strictly increasing even when the clock does not advance between writes
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.inner.last_created.get() {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.inner.last_created.set(Some(stamp));
        stamp
    }

    fn publish_records(&self) {
        let snapshot = self.records();
        self.inner.record_hub.publish(&snapshot);
    }

    fn publish_classes(&self) {
        let snapshot = self.classes();
        self.inner.class_hub.publish(&snapshot);
    }
}

// Records without a timestamp sort last; ties keep insertion order
fn sort_newest_first(records: &mut [SubmissionRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl RecordStream for MemoryStore {
    fn subscribe_records(&self, on_change: SnapshotCallback<SubmissionRecord>) -> Subscription {
        let subscription = self.inner.record_hub.subscribe(on_change);
        let snapshot = self.records();
        self.inner.record_hub.publish_to_latest(&snapshot);
        subscription
    }
}

impl ClassStream for MemoryStore {
    fn subscribe_classes(&self, on_change: SnapshotCallback<ClassRecord>) -> Subscription {
        let subscription = self.inner.class_hub.subscribe(on_change);
        let snapshot = self.classes();
        self.inner.class_hub.publish_to_latest(&snapshot);
        subscription
    }
}

impl SubmissionSink for MemoryStore {
    fn create_submission(&self, payload: &NewSubmission) -> Result<RecordId, StoreError> {
        self.check_writable()?;

        let id = RecordId::generate();
        let record = SubmissionRecord {
            id: id.clone(),
            class_code: payload.class_code.clone(),
            group_name: payload.group_name.clone(),
            members: payload.members.clone(),
            hypothesis: Some(payload.hypothesis),
            conditions: payload.conditions.clone(),
            created_at: Some(self.next_timestamp()),
        };
        debug!(id = %id, class = %record.class_code, "submission stored");

        {
            let mut stored = self.inner.records.borrow_mut();
            stored.insert(0, record);
            sort_newest_first(&mut stored);
        }
        self.publish_records();
        Ok(id)
    }

    fn upsert_class(&self, code: &str, name: &str) -> Result<(), StoreError> {
        self.check_writable()?;

        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(StoreError::Rejected("class code is empty".to_string()));
        }
        debug!(code = %code, "class upserted");

        self.inner
            .classes
            .borrow_mut()
            .insert(code.clone(), ClassRecord::new(code, name.trim()));
        self.publish_classes();
        Ok(())
    }
}
