// src/config/model.rs

use serde::Deserialize;

use crate::errors::Result;
use crate::plan::{ConcurrencyLimit, Step, Task};
use crate::types::Mode;

/// Top-level plan file as read from TOML.
///
/// ```toml
/// plan = [
///   "echo start",
///   [
///     ["fetch a", "analyze a"],
///     { series = ["fetch b", "analyze b"] },
///   ],
///   { name = "report", cmd = "echo done" },
/// ]
///
/// [config]
/// concurrency_limit = 2
/// ```
///
/// `plan` must come before the `[config]` header, otherwise TOML places it
/// inside that table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// The top-level list. It always runs in series.
    #[serde(default)]
    pub plan: Vec<PlanEntry>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub plan: Vec<PlanEntry>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Maximum concurrently running commands; omitted means unbounded.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,

    /// Exit with an error after the plan finishes if any command failed.
    /// Failures never stop the plan itself.
    #[serde(default)]
    pub fail_on_task_error: bool,
}

/// One element of the plan.
///
/// - a string is a shell command;
/// - `{ name = "...", cmd = "..." }` is a labelled shell command;
/// - a nested array is a group in the opposite mode of its enclosing list;
/// - `{ series = [...] }` / `{ parallel = [...] }` are groups with an
///   explicit mode. Arrays nested inside them flip from that mode.
///
/// Variant order matters: derived struct deserializers also accept arrays,
/// so `Group` has to be tried before any of the table forms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlanEntry {
    Command(String),
    Group(Vec<PlanEntry>),
    Named(NamedCommand),
    Series(SeriesGroup),
    Parallel(ParallelGroup),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedCommand {
    #[serde(default)]
    pub name: Option<String>,
    pub cmd: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesGroup {
    pub series: Vec<PlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParallelGroup {
    pub parallel: Vec<PlanEntry>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, plan: Vec<PlanEntry>) -> Self {
        Self { config, plan }
    }

    pub fn concurrency_limit(&self) -> Result<ConcurrencyLimit> {
        match self.config.concurrency_limit {
            Some(n) => ConcurrencyLimit::new(n),
            None => Ok(ConcurrencyLimit::unbounded()),
        }
    }

    /// Number of commands anywhere in the plan.
    pub fn command_count(&self) -> usize {
        self.plan.iter().map(PlanEntry::command_count).sum()
    }

    /// Lower the plan into steps, building each leaf with `make_task(name, cmd)`.
    pub fn steps_with<F>(&self, make_task: F) -> Vec<Step>
    where
        F: Fn(Option<&str>, &str) -> Task,
    {
        lower_entries(&self.plan, Mode::Series, &make_task)
    }
}

impl PlanEntry {
    pub fn command_count(&self) -> usize {
        match self {
            PlanEntry::Command(_) | PlanEntry::Named(_) => 1,
            PlanEntry::Series(SeriesGroup { series: items })
            | PlanEntry::Parallel(ParallelGroup { parallel: items })
            | PlanEntry::Group(items) => items.iter().map(PlanEntry::command_count).sum(),
        }
    }
}

fn lower_entries<F>(entries: &[PlanEntry], mode: Mode, make_task: &F) -> Vec<Step>
where
    F: Fn(Option<&str>, &str) -> Task,
{
    entries
        .iter()
        .map(|entry| lower_entry(entry, mode, make_task))
        .collect()
}

/// `mode` is the mode of the list containing `entry`.
fn lower_entry<F>(entry: &PlanEntry, mode: Mode, make_task: &F) -> Step
where
    F: Fn(Option<&str>, &str) -> Task,
{
    match entry {
        PlanEntry::Command(cmd) => Step::Task(make_task(None, cmd)),
        PlanEntry::Named(named) => Step::Task(make_task(named.name.as_deref(), &named.cmd)),
        PlanEntry::Series(group) => {
            Step::Series(lower_entries(&group.series, Mode::Series, make_task))
        }
        PlanEntry::Parallel(group) => {
            Step::Parallel(lower_entries(&group.parallel, Mode::Parallel, make_task))
        }
        PlanEntry::Group(items) => {
            let child_mode = mode.flipped();
            Step::group(child_mode, lower_entries(items, child_mode, make_task))
        }
    }
}
