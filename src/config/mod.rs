// src/config/mod.rs

//! Plan file loading and validation for the `planrun` binary.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file from disk (`loader.rs`).
//! - Validate it (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    ConfigFile, ConfigSection, NamedCommand, ParallelGroup, PlanEntry, RawConfigFile, SeriesGroup,
};
pub use validate::validate_raw_config;
