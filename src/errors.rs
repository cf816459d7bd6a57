// src/errors.rs

//! Crate-wide error type and result alias.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::dag::{TaskResult, TaskStatus};
use crate::plan::TaskId;

#[derive(Error, Debug)]
pub enum WavefrontError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Cyclic dependency detected involving task '{task}'")]
    CyclicDependency { task: TaskId },

    /// No task is ready while some remain unresolved: either a true cycle or
    /// a dependency that permanently failed. Terminal results are kept for
    /// diagnostics.
    #[error("Deadlock: no runnable task while {} remain unresolved ({})", stalled.len(), stalled.join(", "))]
    Deadlock {
        stalled: Vec<TaskId>,
        results: BTreeMap<TaskId, TaskResult>,
    },

    #[error("Invalid status transition for task '{task}': {from} -> {to}")]
    InvalidTransition {
        task: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Outcome reported for task '{0}' which is not part of the current wave")]
    UnexpectedOutcome(TaskId),

    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WavefrontError>;
