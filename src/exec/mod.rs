// src/exec/mod.rs

//! Collaborator layer.
//!
//! - [`backend`] provides the `WorkerInvoker`, `Synthesizer` and `Planner`
//!   traits the runtime talks to, and their request types.
//! - [`command`] implements them by running configured shell commands.
//! - [`task_runner`] runs a single command process.
//! - [`prompt`] renders the text fed to those commands.

pub mod backend;
pub mod command;
pub mod prompt;
pub mod task_runner;

pub use backend::{Planner, SynthesisRequest, Synthesizer, WorkerInvoker, WorkerRequest};
pub use command::{CommandPlanner, CommandSynthesizer, CommandWorker};
