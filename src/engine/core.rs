// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! [`CoreRuntime`] owns the compiled tree, the ready queue and the in-flight
//! counter. It consumes [`RuntimeEvent`]s and returns [`CoreStep`]s
//! describing which leaf tasks the IO shell should start next.
//!
//! It has no channels, no Tokio types and performs no IO, so tests can step
//! through a whole run deterministically.

use tracing::{debug, info, warn};

use crate::engine::propagator::{finish_and_propagate, release};
use crate::engine::queue::ReadyQueue;
use crate::engine::{DispatchedTask, RuntimeEvent, TaskOutcome};
use crate::plan::{NodeId, NodeKind, NodeState, Tree};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand {
    /// Start these leaf tasks now.
    DispatchTasks(Vec<DispatchedTask>),
}

/// Decision returned by the core after a single step.
#[derive(Debug)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// `false` once the queue is empty and nothing is in flight.
    pub keep_running: bool,
}

impl CoreStep {
    /// Node ids of every task dispatched in this step, in dispatch order.
    pub fn dispatched(&self) -> Vec<NodeId> {
        self.commands
            .iter()
            .flat_map(|cmd| match cmd {
                CoreCommand::DispatchTasks(tasks) => tasks.iter().map(|t| t.node),
            })
            .collect()
    }

    pub fn into_tasks(self) -> Vec<DispatchedTask> {
        self.commands
            .into_iter()
            .flat_map(|cmd| match cmd {
                CoreCommand::DispatchTasks(tasks) => tasks,
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct CoreRuntime {
    tree: Tree,
    queue: ReadyQueue,
    in_flight: usize,
    started: bool,
}

impl CoreRuntime {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            queue: ReadyQueue::new(),
            in_flight: 0,
            started: false,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of leaf tasks dispatched and not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Snapshot of the ready queue, front first.
    pub fn queued(&self) -> Vec<NodeId> {
        self.queue.to_vec()
    }

    /// Nothing queued and nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    /// Seed the queue with the virtual root and dispatch what is ready.
    ///
    /// Only the first call has any effect.
    pub fn start(&mut self) -> CoreStep {
        if self.started {
            warn!("core: start called twice; ignoring");
            return self.idle_step();
        }
        self.started = true;

        info!(
            nodes = self.tree.len(),
            leaves = self.tree.leaf_count(),
            limit = %self.tree.limit(),
            "core: starting plan run"
        );
        release(&mut self.tree, &mut self.queue, NodeId::ROOT);
        self.pump()
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskSettled { node, outcome } => self.handle_settled(node, outcome),
        }
    }

    fn handle_settled(&mut self, node: NodeId, outcome: TaskOutcome) -> CoreStep {
        let Some(entry) = self.tree.node(node) else {
            warn!(node = %node, "core: settlement for unknown node; ignoring");
            return self.idle_step();
        };
        if !entry.is_leaf() || entry.state() != NodeState::Running {
            warn!(
                node = %node,
                state = ?entry.state(),
                "core: settlement for a node that is not running; ignoring"
            );
            return self.idle_step();
        }

        match &outcome {
            TaskOutcome::Success => {
                debug!(node = %node, label = entry.label(), "core: task succeeded");
            }
            TaskOutcome::Failed(reason) => {
                warn!(
                    node = %node,
                    label = entry.label(),
                    reason = %reason,
                    "core: task failed; continuing with the rest of the plan"
                );
            }
        }

        self.in_flight -= 1;
        let finished = finish_and_propagate(&mut self.tree, &mut self.queue, node);
        debug!(node = %node, ?finished, in_flight = self.in_flight, "core: settlement propagated");

        self.pump()
    }

    /// Pop ready nodes from the front: containers expand in place whatever
    /// the limit, leaves are dispatched while a slot is free. Stops at the
    /// first leaf that has to wait.
    fn pump(&mut self) -> CoreStep {
        let mut ready = Vec::new();

        while let Some(id) = self.queue.front() {
            let Some(node) = self.tree.node(id) else {
                warn!(node = %id, "core: queued node missing from tree; skipping");
                self.queue.pop_front();
                continue;
            };
            if node.is_leaf() && !self.tree.limit().has_capacity(self.in_flight) {
                break;
            }
            self.queue.pop_front();

            match node.kind() {
                NodeKind::Container { children, .. } => {
                    let heads: Vec<NodeId> = children
                        .iter()
                        .copied()
                        .filter(|&c| self.tree.node(c).is_some_and(|n| n.master().is_none()))
                        .collect();
                    self.expand(id, heads);
                }
                NodeKind::Leaf { .. } => {
                    if let Some(task) = self.dispatch(id) {
                        ready.push(task);
                    }
                }
            }
        }

        let mut commands = Vec::new();
        if !ready.is_empty() {
            commands.push(CoreCommand::DispatchTasks(ready));
        }
        CoreStep {
            commands,
            keep_running: !self.is_idle(),
        }
    }

    fn expand(&mut self, id: NodeId, heads: Vec<NodeId>) {
        if heads.is_empty() {
            // No children at all: vacuously complete.
            debug!(node = %id, "core: empty container; finishing immediately");
            finish_and_propagate(&mut self.tree, &mut self.queue, id);
            return;
        }

        debug!(node = %id, ?heads, "core: expanding container");
        for &head in &heads {
            if let Some(entry) = self.tree.node_mut(head) {
                entry.set_state(NodeState::Ready);
            }
        }
        self.queue.push_front_batch(&heads);
    }

    fn dispatch(&mut self, id: NodeId) -> Option<DispatchedTask> {
        let entry = self.tree.node_mut(id)?;
        let label = entry.label().map(str::to_string);

        match entry.take_task() {
            Some(task) => {
                entry.set_state(NodeState::Running);
                self.in_flight += 1;
                debug!(node = %id, label = label.as_deref(), in_flight = self.in_flight, "core: dispatching task");
                Some(DispatchedTask {
                    node: id,
                    label,
                    task,
                })
            }
            None => {
                warn!(node = %id, "core: leaf has no task left; treating as settled");
                finish_and_propagate(&mut self.tree, &mut self.queue, id);
                None
            }
        }
    }

    fn idle_step(&self) -> CoreStep {
        CoreStep {
            commands: Vec::new(),
            keep_running: !self.is_idle(),
        }
    }
}
