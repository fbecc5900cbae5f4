// src/plan/task.rs

//! Leaf units of work.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future returned by invoking a [`Task`].
///
/// The engine only distinguishes `Ok` from `Err`; the value itself is never
/// inspected. Data flows between tasks through whatever the closures capture.
pub type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

type TaskFn = Box<dyn FnOnce() -> TaskFuture + Send + 'static>;

/// A zero-argument asynchronous unit of work.
///
/// A task is invoked at most once: [`Task::invoke`] consumes it.
pub struct Task {
    label: Option<String>,
    func: TaskFn,
}

impl Task {
    /// Wrap a closure producing a future.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            label: None,
            func: Box::new(move || Box::pin(func()) as TaskFuture),
        }
    }

    /// Same as [`Task::new`], with a label used in logs and dry-run output.
    pub fn named<F, Fut>(label: impl Into<String>, func: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(func).with_label(label)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Call the wrapped closure and return its future.
    pub fn invoke(self) -> TaskFuture {
        (self.func)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
