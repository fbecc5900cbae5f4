// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `TokioExecutorBackend` used by the runtime.
//! - [`task_runner`] invokes a single task and reports how it settled.
//! - [`command`] builds leaf tasks that run shell commands
//!   (`tokio::process::Command`) for the command-line front end.

pub mod backend;
pub mod command;
pub mod task_runner;

pub use backend::{ExecutorBackend, TokioExecutorBackend};
pub use command::shell_task;
