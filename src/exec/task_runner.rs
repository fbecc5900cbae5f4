// src/exec/task_runner.rs

//! Individual task runner.

use std::any::Any;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{DispatchedTask, RuntimeEvent, TaskOutcome};

/// Invoke one task and report its settlement.
///
/// The task closure and its future run inside a separate Tokio task so a
/// panic in either is caught as a `JoinError`. A returned `Err` and a panic
/// both become [`TaskOutcome::Failed`]; `TaskSettled` is sent in every case.
pub async fn run_task(task: DispatchedTask, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let DispatchedTask { node, label, task } = task;
    debug!(node = %node, label = label.as_deref(), "invoking task");

    let handle = tokio::spawn(async move { task.invoke().await });

    let outcome = match handle.await {
        Ok(Ok(())) => TaskOutcome::Success,
        Ok(Err(err)) => TaskOutcome::Failed(format!("{err:#}")),
        Err(join_err) if join_err.is_panic() => {
            TaskOutcome::Failed(format!("task panicked: {}", panic_message(join_err.into_panic())))
        }
        Err(join_err) => TaskOutcome::Failed(format!("task aborted: {join_err}")),
    };

    debug!(node = %node, label = label.as_deref(), success = outcome.is_success(), "task settled");

    if runtime_tx
        .send(RuntimeEvent::TaskSettled { node, outcome })
        .await
        .is_err()
    {
        warn!(node = %node, "runtime is gone; dropping task settlement");
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
