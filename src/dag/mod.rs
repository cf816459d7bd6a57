// src/dag/mod.rs

//! Task graph and wavefront scheduling.
//!
//! - [`graph`] holds the validated, immutable dependency graph of a plan.
//! - [`validate`] checks plans (unknown/self dependencies, cycles).
//! - [`status_store`] is the per-task status table, updated in batches.
//! - [`scheduler`] is the synchronous wave state machine.
//! - [`scheduler_step`] defines the result types for scheduler steps.
//! - [`task_info`] provides statuses, results, and dispatch payloads.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod status_store;
pub mod task_info;
pub mod validate;

pub use graph::TaskGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::{SchedulerStep, WaveStep};
pub use status_store::{StatusSnapshot, StatusStore};
pub use task_info::{ScheduledTask, TaskOutcome, TaskResult, TaskStatus, Wave};
pub use validate::validate_plan;
