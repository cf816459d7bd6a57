// src/dag/scheduler_step.rs

//! Step-by-step result types for the scheduler.

use crate::dag::task_info::Wave;
use crate::plan::TaskId;

/// What [`crate::dag::Scheduler::next_wave`] decided.
#[derive(Debug, Clone)]
pub enum WaveStep {
    /// These tasks are now `InProgress` and must be dispatched together.
    Dispatch(Wave),
    /// Every task is terminal; nothing left to do.
    Finished,
    /// Tasks remain but none of them can ever become ready.
    Deadlocked {
        /// Unresolved tasks, in plan order.
        stalled: Vec<TaskId>,
    },
}

/// Structured result of merging one wave's outcomes.
///
/// Useful for tests that step the scheduler by hand and for the runtime's
/// progress events.
#[derive(Debug, Clone)]
pub struct SchedulerStep {
    /// Number of the wave that was merged.
    pub wave: u64,
    /// Tasks of this wave that completed.
    pub completed: Vec<TaskId>,
    /// Tasks of this wave whose worker call failed.
    pub failed: Vec<TaskId>,
    /// Dependents marked `Failed` because something upstream failed
    /// (only with [`crate::types::FailurePolicy::Propagate`]).
    pub propagated: Vec<TaskId>,
    /// Whether every task in the graph is now terminal.
    pub all_terminal: bool,
}
