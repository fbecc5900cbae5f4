// src/plan/step.rs

//! Caller-facing plan shapes.
//!
//! Plans are usually written as nested lists ([`PlanNode`]): the top level
//! runs in series, and every nested list flips the mode of the list that
//! contains it. [`Step`] is the explicit form the compiler actually builds
//! from; nested lists are lowered into it once, up front.

use crate::plan::task::Task;
use crate::types::Mode;

/// One element of a nested-list plan.
#[derive(Debug)]
pub enum PlanNode {
    Leaf(Task),
    Group(Vec<PlanNode>),
}

impl From<Task> for PlanNode {
    fn from(task: Task) -> Self {
        PlanNode::Leaf(task)
    }
}

impl From<Vec<PlanNode>> for PlanNode {
    fn from(items: Vec<PlanNode>) -> Self {
        PlanNode::Group(items)
    }
}

/// Explicitly tagged plan element.
#[derive(Debug)]
pub enum Step {
    Task(Task),
    Series(Vec<Step>),
    Parallel(Vec<Step>),
}

impl Step {
    /// Build a group step of the given mode.
    pub fn group(mode: Mode, steps: Vec<Step>) -> Self {
        match mode {
            Mode::Series => Step::Series(steps),
            Mode::Parallel => Step::Parallel(steps),
        }
    }

    /// Lower the elements of a nested list whose siblings run in `mode`.
    ///
    /// Each nested group becomes a group step of the opposite mode, and its
    /// own elements are lowered with that opposite mode in turn.
    pub fn lower(items: Vec<PlanNode>, mode: Mode) -> Vec<Step> {
        items
            .into_iter()
            .map(|item| match item {
                PlanNode::Leaf(task) => Step::Task(task),
                PlanNode::Group(children) => {
                    let child_mode = mode.flipped();
                    Step::group(child_mode, Step::lower(children, child_mode))
                }
            })
            .collect()
    }
}

impl From<Task> for Step {
    fn from(task: Task) -> Self {
        Step::Task(task)
    }
}
