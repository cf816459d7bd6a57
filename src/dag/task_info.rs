// src/dag/task_info.rs

//! Task status, tagged results, and the dispatch payload handed to workers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::plan::{Subtask, TaskId};

/// Status of a task within a run.
///
/// Transitions only move forward: `Pending -> InProgress -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Current status of a task together with its value, if any.
///
/// `Failed` carries the diagnostic string stored for the task
/// (`"Error: <message>"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskResult {
    Pending,
    InProgress,
    Completed(String),
    Failed(String),
}

impl TaskResult {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskResult::Pending => TaskStatus::Pending,
            TaskResult::InProgress => TaskStatus::InProgress,
            TaskResult::Completed(_) => TaskStatus::Completed,
            TaskResult::Failed(_) => TaskStatus::Failed,
        }
    }

    /// The result or error text; `None` while the task is not terminal.
    pub fn value(&self) -> Option<&str> {
        match self {
            TaskResult::Completed(v) | TaskResult::Failed(v) => Some(v.as_str()),
            TaskResult::Pending | TaskResult::InProgress => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Build the `Failed` value for a worker error, prefixing `"Error: "`.
    pub fn failed(message: impl fmt::Display) -> Self {
        TaskResult::Failed(format!("Error: {message}"))
    }
}

/// What a worker call produced for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success(String),
    /// Human-readable failure message (without the `"Error: "` prefix).
    Failure(String),
}

impl From<TaskOutcome> for TaskResult {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Success(value) => TaskResult::Completed(value),
            TaskOutcome::Failure(message) => TaskResult::failed(message),
        }
    }
}

/// Description of a task the scheduler wants a worker to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub task: Subtask,
    /// Results of this task's dependencies, captured once at wave start.
    pub dependency_results: BTreeMap<TaskId, String>,
    /// 1-based number of the wave this task was dispatched in.
    pub wave: u64,
}

impl ScheduledTask {
    pub fn id(&self) -> &str {
        &self.task.id
    }
}

/// A batch of tasks dispatched together.
#[derive(Debug, Clone)]
pub struct Wave {
    /// 1-based, strictly increasing within a run.
    pub number: u64,
    pub tasks: Vec<ScheduledTask>,
}

impl Wave {
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.task.id.clone()).collect()
    }
}
