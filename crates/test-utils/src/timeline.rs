//! Shared recorder for task start/end events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use planrun::Task;

/// One recorded event, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Start(String),
    End(String),
}

#[derive(Debug, Default)]
struct State {
    marks: Vec<Mark>,
    running: usize,
    max_running: usize,
    invocations: HashMap<String, usize>,
}

/// Records when recording tasks start and end, how often each one was
/// invoked, and the peak number running at once.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    state: Arc<Mutex<State>>,
}

/// Records `End` and decrements the running count on drop, so a panicking
/// task is still accounted for.
struct Running {
    timeline: Timeline,
    name: String,
}

impl Drop for Running {
    fn drop(&mut self) {
        let mut state = self.timeline.lock();
        state.running -= 1;
        state.marks.push(Mark::End(self.name.clone()));
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, name: &str) -> Running {
        let mut state = self.lock();
        state.running += 1;
        state.max_running = state.max_running.max(state.running);
        *state.invocations.entry(name.to_string()).or_default() += 1;
        state.marks.push(Mark::Start(name.to_string()));
        Running {
            timeline: self.clone(),
            name: name.to_string(),
        }
    }

    /// Task that sleeps for `delay` and succeeds.
    pub fn task(&self, name: &str, delay: Duration) -> Task {
        let timeline = self.clone();
        let label = name.to_string();
        Task::named(name, move || async move {
            let _running = timeline.begin(&label);
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }

    /// Task that sleeps for `delay` and then returns an error.
    pub fn failing_task(&self, name: &str, delay: Duration) -> Task {
        let timeline = self.clone();
        let label = name.to_string();
        Task::named(name, move || async move {
            let _running = timeline.begin(&label);
            tokio::time::sleep(delay).await;
            Err(anyhow::anyhow!("{label} failed on purpose"))
        })
    }

    /// Task that panics right after starting.
    #[allow(unreachable_code)]
    pub fn panicking_task(&self, name: &str) -> Task {
        let timeline = self.clone();
        let label = name.to_string();
        Task::named(name, move || async move {
            let _running = timeline.begin(&label);
            panic!("{label} panicked on purpose");
            Ok(())
        })
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.lock().marks.clone()
    }

    /// Names in the order they started.
    pub fn starts(&self) -> Vec<String> {
        self.lock()
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Start(name) => Some(name.clone()),
                Mark::End(_) => None,
            })
            .collect()
    }

    /// Position of `name`'s start in the recorded sequence.
    pub fn start_of(&self, name: &str) -> Option<usize> {
        self.position(&Mark::Start(name.to_string()))
    }

    /// Position of `name`'s end in the recorded sequence.
    pub fn end_of(&self, name: &str) -> Option<usize> {
        self.position(&Mark::End(name.to_string()))
    }

    fn position(&self, mark: &Mark) -> Option<usize> {
        self.lock().marks.iter().position(|m| m == mark)
    }

    pub fn invocations(&self, name: &str) -> usize {
        self.lock().invocations.get(name).copied().unwrap_or(0)
    }

    pub fn max_running(&self) -> usize {
        self.lock().max_running
    }
}
