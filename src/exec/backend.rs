// src/exec/backend.rs

//! Pluggable collaborator abstractions.
//!
//! The runtime never produces content itself. It talks to three traits:
//!
//! - [`WorkerInvoker`] answers one subtask, given its dependencies' results.
//! - [`Synthesizer`] turns the final result map into the run's answer.
//! - [`Planner`] turns a free-form request into a [`TaskPlan`].
//!
//! Production implementations in [`super::command`] shell out to configured
//! commands; tests provide fakes that record calls and script outcomes.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::plan::{Subtask, TaskId, TaskPlan};

/// Everything a worker gets for one subtask.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    pub original_request: String,
    pub task_understanding: String,
    pub task: Subtask,
    /// Results of `task`'s dependencies as of the start of its wave.
    pub dependency_results: BTreeMap<TaskId, String>,
}

/// Input for the final aggregation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub original_request: String,
    pub task_understanding: String,
    /// Subtasks in plan order, for labelling results.
    pub tasks: Vec<Subtask>,
    /// Final value per task; tasks without a usable value carry the
    /// configured placeholder.
    pub results: BTreeMap<TaskId, String>,
}

/// Produces the textual answer for one subtask.
///
/// Calls for the tasks of a wave run concurrently on the same instance, so
/// implementations take `&self`.
pub trait WorkerInvoker: Send + Sync {
    fn invoke(
        &self,
        request: WorkerRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

/// Produces the consolidated answer once every subtask is terminal.
pub trait Synthesizer: Send + Sync {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

/// Produces a task plan for a request.
pub trait Planner: Send + Sync {
    fn plan(
        &self,
        request: String,
    ) -> Pin<Box<dyn Future<Output = Result<TaskPlan>> + Send + '_>>;
}
