// src/config/mod.rs

//! Configuration loading and validation for wavefront.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a [`ConfigFile`] with parsed durations (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    CommandConfig, ConfigFile, RawConfigFile, RawSchedulerSection, SchedulerOverrides,
    SchedulerSection,
};
pub use validate::parse_duration;
