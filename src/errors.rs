// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid concurrency limit: {0} (must be >= 1)")]
    InvalidLimit(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlanrunError>;
