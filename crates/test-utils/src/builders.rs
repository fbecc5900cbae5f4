#![allow(dead_code)]

use tokio::sync::oneshot;

use planrun::{compile, run_with, ConcurrencyLimit, PlanNode, RunOptions, Task};

/// Leaf that does nothing. Used by tests that step the pure core and never
/// invoke the task.
pub fn noop(name: &str) -> PlanNode {
    PlanNode::Leaf(Task::named(name, || async { Ok(()) }))
}

pub fn leaf(task: Task) -> PlanNode {
    PlanNode::Leaf(task)
}

pub fn group(items: Vec<PlanNode>) -> PlanNode {
    PlanNode::Group(items)
}

/// Task that fires `done` when invoked.
pub fn signal_task(done: oneshot::Sender<()>) -> Task {
    Task::named("terminal", move || async move {
        let _ = done.send(());
        Ok(())
    })
}

/// Run `plan` with a terminal task appended to the top level and wait until
/// that terminal task has been invoked.
///
/// Panics if it does not happen within 5 seconds.
pub async fn run_and_wait(mut plan: Vec<PlanNode>, limit: ConcurrencyLimit, options: RunOptions) {
    let (done_tx, done_rx) = oneshot::channel();
    plan.push(leaf(signal_task(done_tx)));

    run_with(compile(plan, limit), options);

    crate::with_timeout(done_rx)
        .await
        .expect("terminal task was dropped without running");
}

pub fn limit(n: usize) -> ConcurrencyLimit {
    ConcurrencyLimit::new(n).expect("limit must be >= 1")
}
