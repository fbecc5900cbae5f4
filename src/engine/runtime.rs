// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, DispatchedTask, RuntimeEvent, TaskObserver};

/// Drives a [`CoreRuntime`] in response to task settlements, and delegates
/// actual task execution to an [`ExecutorBackend`].
///
/// All scheduling semantics live in the core; this shell only moves events
/// and tasks across the channel. It is the single owner of the tree for the
/// duration of one run.
pub(crate) struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    observer: Option<Arc<dyn TaskObserver>>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub(crate) fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        observer: Option<Arc<dyn TaskObserver>>,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            observer,
        }
    }

    /// Main event loop. Returns once the queue is empty and no task is in
    /// flight.
    pub(crate) async fn run(mut self) -> Result<()> {
        let step = self.core.start();
        let mut keep_running = step.keep_running;
        for command in step.commands {
            self.execute_command(command).await?;
        }

        while keep_running {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    warn!(
                        in_flight = self.core.in_flight(),
                        "runtime event channel closed before the plan finished"
                    );
                    break;
                }
            };

            debug!(?event, "runtime received event");
            self.notify_settled(&event);

            let step = self.core.step(event);
            keep_running = step.keep_running;
            for command in step.commands {
                self.execute_command(command).await?;
            }
        }

        info!("plan run finished");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => self.spawn_ready(tasks).await,
        }
    }

    async fn spawn_ready(&mut self, tasks: Vec<DispatchedTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        if let Some(observer) = &self.observer {
            for t in &tasks {
                observer.task_started(t.node, t.label.as_deref());
            }
        }

        let nodes: Vec<_> = tasks.iter().map(|t| t.node).collect();
        debug!(?nodes, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }

    fn notify_settled(&self, event: &RuntimeEvent) {
        let Some(observer) = &self.observer else {
            return;
        };
        match event {
            RuntimeEvent::TaskSettled { node, outcome } => {
                let label = self.core.tree().node(*node).and_then(|n| n.label());
                observer.task_settled(*node, label, outcome);
            }
        }
    }
}
