// src/plan/compiler.rs

//! Plan compiler: nested plan → [`Tree`].
//!
//! One recursive descent assigns ids in pre-order (a container gets its id
//! before any of its children), records each node's parent, and chains
//! siblings of series groups through `master`/`slave`. Parallel siblings get
//! no master. The plan's shape is not validated.

use tracing::debug;

use crate::plan::limit::ConcurrencyLimit;
use crate::plan::step::{PlanNode, Step};
use crate::plan::task::Task;
use crate::plan::tree::{Node, NodeId, NodeKind, Tree};
use crate::types::Mode;

/// Mode of the virtual root, i.e. of the top-level list.
const ROOT_MODE: Mode = Mode::Series;

/// Compile a nested-list plan. The top level runs in series and each nested
/// list flips the mode of the list containing it.
pub fn compile(plan: Vec<PlanNode>, limit: ConcurrencyLimit) -> Tree {
    compile_steps(Step::lower(plan, ROOT_MODE), limit)
}

/// Compile explicitly tagged steps. `steps` form the top-level series group.
pub fn compile_steps(steps: Vec<Step>, limit: ConcurrencyLimit) -> Tree {
    let mut builder = TreeBuilder::default();
    let root = builder.push(
        None,
        None,
        NodeKind::Container {
            mode: ROOT_MODE,
            children: Vec::new(),
        },
    );
    builder.add_group(root, ROOT_MODE, steps);

    let tree = Tree::from_nodes(builder.nodes, limit);
    debug!(
        nodes = tree.len(),
        leaves = tree.leaf_count(),
        %limit,
        "compiled plan"
    );
    tree
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    fn push(&mut self, parent: Option<NodeId>, master: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(id, parent, master, kind));

        if let Some(parent) = parent {
            self.nodes[parent.index()].push_child(id);
        }
        if let Some(master) = master {
            self.nodes[master.index()].set_slave(id);
        }
        id
    }

    fn add_group(&mut self, parent: NodeId, mode: Mode, steps: Vec<Step>) {
        let mut previous: Option<NodeId> = None;

        for step in steps {
            let master = match mode {
                Mode::Series => previous,
                Mode::Parallel => None,
            };
            let id = match step {
                Step::Task(task) => self.push_leaf(parent, master, task),
                Step::Series(children) => self.push_container(parent, master, Mode::Series, children),
                Step::Parallel(children) => {
                    self.push_container(parent, master, Mode::Parallel, children)
                }
            };
            previous = Some(id);
        }
    }

    fn push_leaf(&mut self, parent: NodeId, master: Option<NodeId>, task: Task) -> NodeId {
        let label = task.label().map(str::to_string);
        self.push(
            Some(parent),
            master,
            NodeKind::Leaf {
                label,
                task: Some(task),
            },
        )
    }

    fn push_container(
        &mut self,
        parent: NodeId,
        master: Option<NodeId>,
        mode: Mode,
        children: Vec<Step>,
    ) -> NodeId {
        let id = self.push(
            Some(parent),
            master,
            NodeKind::Container {
                mode,
                children: Vec::new(),
            },
        );
        self.add_group(id, mode, children);
        id
    }
}
