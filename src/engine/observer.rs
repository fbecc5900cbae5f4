// src/engine/observer.rs

//! Optional hook for watching leaf tasks start and settle.
//!
//! The engine never surfaces task failures to the caller of
//! [`run`](crate::engine::run). A [`TaskObserver`] is the way to notice them
//! without changing that default.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::TaskOutcome;
use crate::plan::NodeId;

/// Callbacks invoked by the runtime. Both default to doing nothing.
///
/// Called from the runtime's event loop, so implementations should return
/// quickly.
pub trait TaskObserver: Send + Sync {
    fn task_started(&self, _node: NodeId, _label: Option<&str>) {}

    fn task_settled(&self, _node: NodeId, _label: Option<&str>, _outcome: &TaskOutcome) {}
}

/// Observer that counts started, succeeded and failed tasks.
#[derive(Debug, Default)]
pub struct OutcomeTally {
    started: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl TaskObserver for OutcomeTally {
    fn task_started(&self, _node: NodeId, _label: Option<&str>) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn task_settled(&self, _node: NodeId, _label: Option<&str>, outcome: &TaskOutcome) {
        let counter = if outcome.is_success() {
            &self.succeeded
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}
