// src/plan/model.rs

use serde::{Deserialize, Serialize};

/// Canonical task identifier type used throughout the crate.
pub type TaskId = String;

/// A complete plan as returned by the planner:
///
/// ```json
/// {
///   "task_understanding": "Compare two databases for a small team",
///   "subtasks": [
///     { "id": "subtask_1", "title": "Research", "description": "...",
///       "required_expertise": "Data Analyst", "priority": 1, "dependencies": [] }
///   ],
///   "execution_strategy": "Research first, then write"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    /// Summary of the overall goal, handed to every worker and the synthesizer.
    pub task_understanding: String,

    /// All subtasks, in the order the planner listed them.
    pub subtasks: Vec<Subtask>,

    /// Free-form description of how the subtasks relate. Informational only.
    #[serde(default)]
    pub execution_strategy: String,
}

/// One unit of work in a plan.
///
/// Only `id` and `dependencies` matter to scheduling; the remaining fields are
/// passed through untouched to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: TaskId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Role hint for the worker (e.g. "Data Analyst").
    #[serde(default)]
    pub required_expertise: String,

    /// Execution priority, 1 being the highest.
    #[serde(default = "default_priority")]
    pub priority: i64,

    /// Ids of subtasks whose results this one needs.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
}

fn default_priority() -> i64 {
    1
}

impl Subtask {
    /// Minimal subtask with an id and dependencies; payload fields are empty.
    pub fn new(id: impl Into<TaskId>, dependencies: Vec<TaskId>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            description: String::new(),
            required_expertise: String::new(),
            priority: default_priority(),
            dependencies,
        }
    }
}
