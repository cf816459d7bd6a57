// src/plan/mod.rs

//! Task plans produced by the planning collaborator.
//!
//! - [`model`] is the serde mapping of the plan JSON.
//! - [`loader`] reads a plan from a file or stdin.

pub mod loader;
pub mod model;

pub use loader::{load_plan, parse_plan};
pub use model::{Subtask, TaskId, TaskPlan};
