// src/lib.rs

//! In-process engine for hierarchical plans of async tasks.
//!
//! A plan is a nested list: the top level runs in series, and every nested
//! list flips between parallel and series. [`compile`] turns it into a
//! [`Tree`]; [`run`] executes the tree in the background under the tree's
//! concurrency limit.
//!
//! ```no_run
//! use planrun::{compile, run, ConcurrencyLimit, PlanNode, Task};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let (done_tx, done_rx) = tokio::sync::oneshot::channel();
//! let plan = vec![
//!     PlanNode::Group(vec![
//!         PlanNode::Group(vec![
//!             Task::named("fetch a", || async { Ok(()) }).into(),
//!             Task::named("analyze a", || async { Ok(()) }).into(),
//!         ]),
//!         PlanNode::Group(vec![
//!             Task::named("fetch b", || async { Ok(()) }).into(),
//!             Task::named("analyze b", || async { Ok(()) }).into(),
//!         ]),
//!     ]),
//!     // Runs only after both branches have finished.
//!     Task::new(move || async move {
//!         let _ = done_tx.send(());
//!         Ok(())
//!     })
//!     .into(),
//! ];
//!
//! run(compile(plan, ConcurrencyLimit::new(2)?));
//! done_rx.await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod types;

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::exec::shell_task;

pub use crate::engine::{
    run, run_with, run_with_backend, OutcomeTally, RunOptions, TaskObserver, TaskOutcome,
};
pub use crate::plan::{compile, compile_steps, ConcurrencyLimit, NodeId, PlanNode, Step, Task, Tree};
pub use crate::types::Mode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan file loading
/// - compilation with shell-command leaves
/// - a terminal task that tells us when the plan is done
/// - Ctrl-C handling
pub async fn run_cli(args: CliArgs) -> Result<()> {
    let config_path = &args.config;
    let cfg = load_and_validate(config_path)
        .with_context(|| format!("loading plan file {}", config_path.display()))?;

    let limit = match args.limit {
        Some(n) => ConcurrencyLimit::new(n)?,
        None => cfg.concurrency_limit()?,
    };

    if args.dry_run {
        let tree = compile_steps(steps_from_config(&cfg), limit);
        print_dry_run(&cfg, &tree);
        return Ok(());
    }

    let (done_tx, done_rx) = oneshot::channel::<()>();
    let mut steps = steps_from_config(&cfg);
    steps.push(Step::Task(Task::named("planrun: done", move || async move {
        let _ = done_tx.send(());
        Ok(())
    })));

    let tree = compile_steps(steps, limit);
    let tally = Arc::new(OutcomeTally::new());
    info!(commands = cfg.command_count(), %limit, "running plan");
    run_with(tree, RunOptions::default().with_observer(tally.clone()));

    tokio::select! {
        res = done_rx => {
            res.map_err(|_| anyhow!("plan runtime stopped before reaching the end of the plan"))?;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("listening for Ctrl+C")?;
            bail!("interrupted by Ctrl+C");
        }
    }

    // Every command has settled by now. The terminal task has started but
    // its own settlement may not have been observed yet.
    let failed = tally.failed();
    let succeeded = tally.started().saturating_sub(1 + failed);
    info!(succeeded, failed, "plan finished");

    if failed > 0 {
        warn!(failed, "some commands failed");
        if cfg.config.fail_on_task_error {
            bail!("{failed} command(s) failed");
        }
    }
    Ok(())
}

fn steps_from_config(cfg: &ConfigFile) -> Vec<Step> {
    cfg.steps_with(shell_task)
}

/// Simple dry-run output: print settings and the compiled tree.
fn print_dry_run(cfg: &ConfigFile, tree: &Tree) {
    println!("planrun dry-run");
    println!("  concurrency_limit = {}", tree.limit());
    println!("  fail_on_task_error = {}", cfg.config.fail_on_task_error);
    println!("  commands = {}", cfg.command_count());
    println!();
    print!("{tree}");
}
