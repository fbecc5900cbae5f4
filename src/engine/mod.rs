// src/engine/mod.rs

//! Execution engine for compiled plans.
//!
//! This module ties together:
//! - the ready queue ([`queue`]) ordered most-recently-unblocked-first
//! - the completion propagator ([`propagator`]) that finishes nodes and
//!   releases their series successors and ancestors
//! - the pure core state machine ([`core`]) that decides what to dispatch
//! - the async shell ([`runtime`]) that feeds task settlements back into
//!   the core
//!
//! Callers only see [`run`], [`run_with`] and [`run_with_backend`]. All are
//! fire-and-forget: the engine exposes no completion signal. Append a
//! terminal task to the top-level plan to learn when everything before it
//! has finished.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::error;

use crate::exec::{ExecutorBackend, TokioExecutorBackend};
use crate::plan::{NodeId, Task, Tree};

pub mod core;
pub mod observer;
pub(crate) mod propagator;
pub mod queue;
pub(crate) mod runtime;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use observer::{OutcomeTally, TaskObserver};
pub use queue::ReadyQueue;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How a leaf task settled. Both variants advance the plan identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The task returned an error or panicked.
    Failed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Events flowing from executors back into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A dispatched leaf task settled.
    TaskSettled { node: NodeId, outcome: TaskOutcome },
}

/// A leaf the core wants started now.
#[derive(Debug)]
pub struct DispatchedTask {
    pub node: NodeId,
    pub label: Option<String>,
    pub task: Task,
}

/// Options for [`run_with`].
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Notified when each leaf starts and settles. Failures are otherwise
    /// only logged.
    pub observer: Option<Arc<dyn TaskObserver>>,
}

impl RunOptions {
    pub fn with_observer(mut self, observer: Arc<dyn TaskObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Run a compiled tree in the background on the current Tokio runtime.
///
/// Must be called from within a Tokio runtime. Returns immediately.
pub fn run(tree: Tree) {
    run_with(tree, RunOptions::default());
}

/// Same as [`run`], with an optional [`TaskObserver`].
pub fn run_with(tree: Tree, options: RunOptions) {
    run_with_backend(tree, options, TokioExecutorBackend::new);
}

/// Same as [`run_with`], but dispatched tasks go to the executor built by
/// `make_executor`. It receives the sender on which it must report one
/// [`RuntimeEvent::TaskSettled`] per dispatched task.
pub fn run_with_backend<E, F>(tree: Tree, options: RunOptions, make_executor: F)
where
    E: ExecutorBackend + 'static,
    F: FnOnce(mpsc::Sender<RuntimeEvent>) -> E,
{
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);
    let executor = make_executor(rt_tx);
    let runtime = runtime::Runtime::new(CoreRuntime::new(tree), rt_rx, executor, options.observer);

    tokio::spawn(async move {
        if let Err(err) = runtime.run().await {
            error!(error = %err, "plan runtime stopped with an error");
        }
    });
}
