// src/engine/mod.rs

//! Orchestration engine for wavefront.
//!
//! This module ties together:
//! - the wavefront scheduler (which tasks run in which wave)
//! - the run lifecycle (`Planning -> Executing -> AwaitingSynthesis -> Done`)
//! - the fire-once completion trigger that hands results to synthesis
//! - the async runtime that dispatches waves to the worker collaborator
//!
//! The lifecycle state machine lives in [`core`] and [`completion`]; the
//! async/IO shell is implemented in [`runtime`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::dag::{TaskResult, TaskStatus};
use crate::plan::TaskId;

/// Phase of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting for a validated plan.
    Planning,
    /// Waves are being dispatched.
    Executing,
    /// Every task is terminal; synthesis has been requested.
    AwaitingSynthesis,
    /// The answer is available.
    Done,
    /// The run ended with an error (deadlock, synthesis failure, ...).
    Errored,
}

impl RunState {
    pub fn is_final(self) -> bool {
        matches!(self, RunState::Done | RunState::Errored)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Planning => "planning",
            RunState::Executing => "executing",
            RunState::AwaitingSynthesis => "awaiting_synthesis",
            RunState::Done => "done",
            RunState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Runtime options used by the async shell.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Upper bound on worker calls in flight at once. `None` = unbounded.
    pub max_concurrency: Option<usize>,
    /// Per-call deadline for a worker. `None` = wait forever.
    pub task_timeout: Option<Duration>,
    /// Value handed to synthesis for tasks without a usable result.
    pub placeholder: String,
}

/// Substituted for tasks that have no value at synthesis time.
pub const DEFAULT_PLACEHOLDER: &str = "No result generated.";

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            task_timeout: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl RuntimeOptions {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            max_concurrency: cfg.scheduler.max_concurrency,
            task_timeout: cfg.scheduler.task_timeout,
            placeholder: cfg.scheduler.placeholder.clone(),
        }
    }
}

/// Progress notifications emitted by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    StateChanged {
        from: RunState,
        to: RunState,
    },
    WaveDispatched {
        wave: u64,
        tasks: Vec<TaskId>,
    },
    TaskFinished {
        wave: u64,
        task: TaskId,
        status: TaskStatus,
    },
    WaveCompleted {
        wave: u64,
        completed: Vec<TaskId>,
        failed: Vec<TaskId>,
    },
    Deadlocked {
        stalled: Vec<TaskId>,
    },
}

/// What a successful run returns.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Output of the synthesis collaborator.
    pub answer: String,
    /// Final result per task.
    pub results: BTreeMap<TaskId, TaskResult>,
    /// Task ids of every dispatched wave, in order.
    pub waves: Vec<Vec<TaskId>>,
}

pub mod completion;
pub mod core;
pub mod runtime;

pub use self::completion::CompletionTrigger;
pub use self::core::{LifecycleEvent, RunLifecycle};
pub use self::runtime::Runtime;
