use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use planrun::engine::{DispatchedTask, RuntimeEvent, TaskOutcome};
use planrun::errors::Result;
use planrun::exec::ExecutorBackend;

/// Executor that never invokes a task. It:
/// - reports each dispatched task's label (or `#id`) on `dispatched_tx`
/// - settles it right away, `Failed` if its label was marked failing.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    dispatched_tx: mpsc::UnboundedSender<String>,
    failing: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        dispatched_tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            runtime_tx,
            dispatched_tx,
            failing: HashSet::new(),
        }
    }

    pub fn failing<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(labels.into_iter().map(Into::into));
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<DispatchedTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let mut settled = Vec::with_capacity(tasks.len());
        for t in tasks {
            let name = t.label.unwrap_or_else(|| t.node.to_string());
            let outcome = if self.failing.contains(&name) {
                TaskOutcome::Failed(format!("{name} marked as failing"))
            } else {
                TaskOutcome::Success
            };
            let _ = self.dispatched_tx.send(name);
            settled.push((t.node, outcome));
        }

        let tx = self.runtime_tx.clone();
        Box::pin(async move {
            // Sent from a separate task: the runtime only drains the channel
            // once this future has returned.
            tokio::spawn(async move {
                for (node, outcome) in settled {
                    if tx.send(RuntimeEvent::TaskSettled { node, outcome }).await.is_err() {
                        break;
                    }
                }
            });
            Ok(())
        })
    }
}
