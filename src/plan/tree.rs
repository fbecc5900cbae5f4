// src/plan/tree.rs

//! Compiled plan: an arena of nodes addressed by [`NodeId`].
//!
//! Parent, master and slave relationships are indices into the arena, so
//! the tree has no interior pointers and every lookup is O(1).

use std::fmt;

use crate::plan::limit::ConcurrencyLimit;
use crate::plan::task::Task;
use crate::types::Mode;

/// Index of a node within one [`Tree`].
///
/// `NodeId::ROOT` (0) is the virtual root owning the top-level list; real
/// nodes are numbered from 1 in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node lifecycle. Containers never enter `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Waiting for its parent to be expanded or for its master to finish.
    Pending,
    /// Sitting in the ready queue.
    Ready,
    /// Leaf task dispatched and not yet settled.
    Running,
    Finished,
}

#[derive(Debug)]
pub enum NodeKind {
    /// Schedulable unit of work. `task` is taken when the leaf is dispatched.
    Leaf {
        label: Option<String>,
        task: Option<Task>,
    },
    /// Nested group; `mode` is the mode its children were compiled in.
    Container { mode: Mode, children: Vec<NodeId> },
}

#[derive(Debug)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    master: Option<NodeId>,
    slave: Option<NodeId>,
    state: NodeState,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        parent: Option<NodeId>,
        master: Option<NodeId>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id,
            parent,
            master,
            slave: None,
            state: NodeState::Pending,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Container that produced this node; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Sibling this node must wait for.
    pub fn master(&self) -> Option<NodeId> {
        self.master
    }

    /// Sibling waiting for this node.
    pub fn slave(&self) -> Option<NodeId> {
        self.slave
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == NodeState::Finished
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { label, .. } => label.as_deref(),
            NodeKind::Container { .. } => None,
        }
    }

    /// Mode of this container's children, `None` for leaves.
    pub fn mode(&self) -> Option<Mode> {
        match &self.kind {
            NodeKind::Container { mode, .. } => Some(*mode),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Direct children in declaration order (empty for leaves).
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Container { children, .. } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub(crate) fn set_slave(&mut self, slave: NodeId) {
        self.slave = Some(slave);
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        if let NodeKind::Container { children, .. } = &mut self.kind {
            children.push(child);
        }
    }

    pub(crate) fn take_task(&mut self) -> Option<Task> {
        match &mut self.kind {
            NodeKind::Leaf { task, .. } => task.take(),
            NodeKind::Container { .. } => None,
        }
    }
}

/// A compiled plan plus the concurrency limit it should run under.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    limit: ConcurrencyLimit,
}

impl Tree {
    pub(crate) fn from_nodes(nodes: Vec<Node>, limit: ConcurrencyLimit) -> Self {
        Self { nodes, limit }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes including the virtual root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn limit(&self) -> ConcurrencyLimit {
        self.limit
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let Some(node) = self.node(id) else {
            return Ok(());
        };

        write!(f, "{:indent$}{}", "", node.id, indent = depth * 2)?;
        match &node.kind {
            NodeKind::Leaf { label, .. } => {
                write!(f, " task")?;
                if let Some(label) = label {
                    write!(f, " {label}")?;
                }
            }
            NodeKind::Container { mode, .. } => write!(f, " {mode}")?,
        }
        if let Some(master) = node.master {
            write!(f, " (after {master})")?;
        }
        writeln!(f)?;

        for &child in node.children() {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, NodeId::ROOT, 0)
    }
}
