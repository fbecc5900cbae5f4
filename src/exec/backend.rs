// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning tasks
//! itself. `TokioExecutorBackend` is the implementation used by
//! [`run`](crate::engine::run): every dispatched task gets its own Tokio
//! task, and its settlement is reported back as
//! [`RuntimeEvent::TaskSettled`].

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::{DispatchedTask, RuntimeEvent};
use crate::errors::Result;

use super::task_runner::run_task;

/// Trait abstracting how dispatched tasks are executed.
///
/// Implementations must eventually send exactly one `TaskSettled` event per
/// dispatched task, whatever the task's outcome.
pub trait ExecutorBackend: Send {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<DispatchedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

pub struct TokioExecutorBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl TokioExecutorBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { runtime_tx }
    }
}

impl ExecutorBackend for TokioExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<DispatchedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            for task in tasks {
                tokio::spawn(run_task(task, tx.clone()));
            }
            Ok(())
        })
    }
}
