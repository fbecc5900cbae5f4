// src/engine/propagator.rs

//! Completion propagation.
//!
//! When a node finishes:
//! 1. it is marked `Finished`;
//! 2. its slave (the series sibling waiting on it), if any, becomes ready
//!    and goes to the front of the queue;
//! 3. if every child of its parent is now finished, the parent finishes too
//!    and steps 2-3 repeat for the parent.
//!
//! The cascade may climb several levels within one settlement.

use tracing::{debug, warn};

use crate::engine::queue::ReadyQueue;
use crate::plan::{NodeId, NodeState, Tree};

/// Finish `node` and cascade up the tree. Returns every node that became
/// finished, starting with `node` itself.
pub fn finish_and_propagate(tree: &mut Tree, queue: &mut ReadyQueue, node: NodeId) -> Vec<NodeId> {
    let mut finished = Vec::new();
    let mut current = node;

    loop {
        let Some(entry) = tree.node_mut(current) else {
            warn!(node = %current, "propagate: unknown node; stopping cascade");
            break;
        };
        if entry.is_finished() {
            warn!(node = %current, "propagate: node already finished; stopping cascade");
            break;
        }

        entry.set_state(NodeState::Finished);
        finished.push(current);
        let slave = entry.slave();
        let parent = entry.parent();

        if let Some(slave) = slave {
            release(tree, queue, slave);
        }

        let Some(parent) = parent else {
            debug!("propagate: root finished");
            break;
        };
        if !all_children_finished(tree, parent) {
            break;
        }
        debug!(node = %parent, "propagate: all children finished; finishing container");
        current = parent;
    }

    finished
}

/// Mark `node` ready and put it at the front of the queue.
pub fn release(tree: &mut Tree, queue: &mut ReadyQueue, node: NodeId) {
    match tree.node_mut(node) {
        Some(entry) if entry.state() == NodeState::Pending => {
            entry.set_state(NodeState::Ready);
            queue.push_front(node);
        }
        Some(entry) => {
            warn!(node = %node, state = ?entry.state(), "release: node is not pending; ignoring");
        }
        None => warn!(node = %node, "release: unknown node; ignoring"),
    }
}

fn all_children_finished(tree: &Tree, parent: NodeId) -> bool {
    tree.children_of(parent)
        .iter()
        .all(|&child| tree.node(child).is_some_and(|n| n.is_finished()))
}
