//! Reactive recomputation of the dashboard
//!
//! [`ReactivePipeline`] subscribes to the record and class streams and
//! re-derives every view, in full, whenever either stream emits or the active
//! filter changes. Each result is an immutable [`DashboardSnapshot`] handed to
//! the presenter behind an `Rc`.
//!
//! Once the pipeline is disposed (or dropped) no further recomputation runs
//! and the presenter is never called again.

use crate::aggregate::{class_tabs, derive_views, ClassTabs, DashboardViews};
use crate::config::{ConfigError, EngineConfig};
use crate::filter::{ActiveFilter, FilterController};
use crate::record::{ClassRecord, SubmissionRecord};
use crate::stream::{ClassStream, RecordStream, Subscription};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, trace};

/// Everything the presentation layer renders for one input state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub views: DashboardViews,
    pub class_tabs: ClassTabs,
}

type Presenter = Box<dyn FnMut(Rc<DashboardSnapshot>)>;

struct PipelineState {
    records: Vec<SubmissionRecord>,
    classes: Vec<ClassRecord>,
    filter: FilterController,
    config: EngineConfig,
    latest: Option<Rc<DashboardSnapshot>>,
    // Inputs are buffered but not derived until `connect` finishes
    ready: bool,
    disposed: bool,
}

struct Shared {
    state: RefCell<PipelineState>,
    presenter: RefCell<Option<Presenter>>,
    // A newer snapshot exists that the presenter has not seen
    pending: Cell<bool>,
}

/// Live pipeline from record streams to the presenter
pub struct ReactivePipeline {
    shared: Rc<Shared>,
    subscriptions: Vec<Subscription>,
}

impl ReactivePipeline {
    /// Subscribe to both streams and publish the first snapshot
    ///
    /// Fails only when `config` does not validate.
    pub fn connect(
        records: &dyn RecordStream,
        classes: &dyn ClassStream,
        config: EngineConfig,
        presenter: impl FnMut(Rc<DashboardSnapshot>) + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let shared = Rc::new(Shared {
            state: RefCell::new(PipelineState {
                records: Vec::new(),
                classes: Vec::new(),
                filter: FilterController::default(),
                config,
                latest: None,
                ready: false,
                disposed: false,
            }),
            presenter: RefCell::new(Some(Box::new(presenter))),
            pending: Cell::new(false),
        });

        let weak = Rc::downgrade(&shared);
        let record_sub = records.subscribe_records(Box::new(move |snapshot: &[SubmissionRecord]| {
            on_input(&weak, |state| state.records = snapshot.to_vec());
        }));
        let weak = Rc::downgrade(&shared);
        let class_sub = classes.subscribe_classes(Box::new(move |snapshot: &[ClassRecord]| {
            on_input(&weak, |state| state.classes = snapshot.to_vec());
        }));
        trace!("pipeline subscribed to record and class streams");

        shared.state.borrow_mut().ready = true;
        recompute(&shared);

        Ok(Self {
            shared,
            subscriptions: vec![record_sub, class_sub],
        })
    }

    /// Change the class filter; recomputes only when the selection changed
    pub fn set_filter(&self, filter: ActiveFilter) -> bool {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            !state.disposed && state.filter.set(filter)
        };
        if changed {
            recompute(&self.shared);
        }
        changed
    }

    /// Apply a selector value: `ALL` or a class code
    pub fn select_class(&self, selection: &str) -> bool {
        self.set_filter(ActiveFilter::from_selection(selection))
    }

    pub fn active_filter(&self) -> ActiveFilter {
        self.shared.state.borrow().filter.active().clone()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Option<Rc<DashboardSnapshot>> {
        self.shared.state.borrow().latest.clone()
    }

    /// Stop listening; the presenter is never called again
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for ReactivePipeline {
    fn drop(&mut self) {
        self.shared.state.borrow_mut().disposed = true;
        self.shared.presenter.borrow_mut().take();
        self.subscriptions.clear();
        trace!("pipeline disposed");
    }
}

fn on_input(weak: &Weak<Shared>, update: impl FnOnce(&mut PipelineState)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let ready = {
        let mut state = shared.state.borrow_mut();
        if state.disposed {
            return;
        }
        update(&mut state);
        state.ready
    };
    if ready {
        recompute(&shared);
    }
}

fn recompute(shared: &Shared) {
    {
        let mut state = shared.state.borrow_mut();
        if state.disposed {
            return;
        }

        let start = Instant::now();
        let views = derive_views(&state.records, state.filter.active(), &state.config);
        let tabs = class_tabs(&state.records, &state.classes);
        debug!(
            records = state.records.len(),
            filtered = views.filtered_records,
            filter = %state.filter.active(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "dashboard recomputed"
        );

        state.latest = Some(Rc::new(DashboardSnapshot {
            views,
            class_tabs: tabs,
        }));
    }
    shared.pending.set(true);
    deliver(shared);
}

// A presenter that triggers another recompute is not re-entered; the newer
// snapshot is delivered once it returns.
fn deliver(shared: &Shared) {
    let Some(mut presenter) = shared.presenter.borrow_mut().take() else {
        return;
    };

    while shared.pending.replace(false) {
        let latest = {
            let state = shared.state.borrow();
            if state.disposed {
                return;
            }
            state.latest.clone()
        };
        if let Some(snapshot) = latest {
            presenter(snapshot);
        }
    }

    if !shared.state.borrow().disposed {
        *shared.presenter.borrow_mut() = Some(presenter);
    }
}
