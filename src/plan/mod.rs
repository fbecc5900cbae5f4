// src/plan/mod.rs

//! Plan representation and compilation.
//!
//! - [`task`] defines the leaf unit of work ([`Task`]).
//! - [`step`] holds the caller-facing plan shapes: the nested-list
//!   [`PlanNode`] form and the explicit [`Step`] builder.
//! - [`limit`] provides the [`ConcurrencyLimit`] carried by a compiled tree.
//! - [`tree`] is the arena of compiled nodes with parent/master edges.
//! - [`compiler`] turns a plan into a [`Tree`].

pub mod compiler;
pub mod limit;
pub mod step;
pub mod task;
pub mod tree;

pub use compiler::{compile, compile_steps};
pub use limit::ConcurrencyLimit;
pub use step::{PlanNode, Step};
pub use task::{Task, TaskFuture};
pub use tree::{Node, NodeId, NodeKind, NodeState, Tree};
