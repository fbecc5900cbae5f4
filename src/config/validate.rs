// src/config/validate.rs

use crate::config::model::{ConfigFile, PlanEntry, RawConfigFile};
use crate::errors::{PlanrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PlanrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.plan))
    }
}

/// Check a raw config. The plan's shape itself is never rejected: empty
/// lists and arbitrary nesting are legal.
pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_entries(&cfg.plan, "plan")?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.concurrency_limit == Some(0) {
        return Err(PlanrunError::ConfigError(
            "[config].concurrency_limit must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_entries(entries: &[PlanEntry], path: &str) -> Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        let here = format!("{path}[{i}]");
        match entry {
            PlanEntry::Command(cmd) => ensure_command(cmd, &here)?,
            PlanEntry::Named(named) => {
                ensure_command(&named.cmd, &here)?;
                if named.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                    return Err(PlanrunError::ConfigError(format!(
                        "{here}: `name` must not be empty"
                    )));
                }
            }
            PlanEntry::Series(group) => validate_entries(&group.series, &format!("{here}.series"))?,
            PlanEntry::Parallel(group) => {
                validate_entries(&group.parallel, &format!("{here}.parallel"))?
            }
            PlanEntry::Group(items) => validate_entries(items, &here)?,
        }
    }
    Ok(())
}

fn ensure_command(cmd: &str, path: &str) -> Result<()> {
    if cmd.trim().is_empty() {
        return Err(PlanrunError::ConfigError(format!(
            "{path}: command must not be empty"
        )));
    }
    Ok(())
}
