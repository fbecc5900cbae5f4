// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::trace;

use crate::plan::NodeId;

/// Ready queue of node ids waiting for dispatch.
///
/// Semantics:
/// - Newly eligible nodes are inserted at the *front*. A batch inserted
///   together keeps its declaration order.
/// - The scheduler always pops from the front.
///
/// Net effect: nodes unblocked most recently are dispatched before older
/// nodes that are still waiting for a free slot, while siblings released
/// together still go left to right.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    entries: VecDeque<NodeId>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert a single node ahead of everything already queued.
    pub fn push_front(&mut self, node: NodeId) {
        trace!(node = %node, "queue: push front");
        self.entries.push_front(node);
    }

    /// Insert `nodes` ahead of everything already queued, keeping their
    /// relative order: the first element of `nodes` is popped first.
    pub fn push_front_batch(&mut self, nodes: &[NodeId]) {
        trace!(?nodes, "queue: push front batch");
        for &node in nodes.iter().rev() {
            self.entries.push_front(node);
        }
    }

    /// Next node to be popped, without removing it.
    pub fn front(&self) -> Option<NodeId> {
        self.entries.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<NodeId> {
        self.entries.pop_front()
    }

    /// Snapshot of the queue, front first.
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.entries.iter().copied().collect()
    }
}
