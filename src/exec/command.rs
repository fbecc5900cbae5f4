// src/exec/command.rs

//! Shell command leaf tasks, used by the `planrun` command-line front end.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::plan::Task;

/// Build a task that runs `cmd` through the platform shell.
///
/// The task fails when the process cannot be spawned or exits unsuccessfully.
/// stdout lines are logged at `info`, stderr lines at `debug`. Without a
/// `label`, the command line itself is used.
pub fn shell_task(label: Option<&str>, cmd: &str) -> Task {
    let label = label.unwrap_or(cmd).to_string();
    let cmd = cmd.to_string();
    let task_label = label.clone();

    Task::named(label, move || async move { run_shell(&task_label, &cmd).await })
}

async fn run_shell(label: &str, cmd_line: &str) -> Result<()> {
    info!(task = %label, cmd = %cmd_line, "starting task process");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{label}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = label.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "stdout: {}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let task_name = label.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{label}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(task = %label, exit_code = code, success = status.success(), "task process exited");

    if !status.success() {
        bail!("task '{label}' exited with code {code}");
    }
    Ok(())
}
