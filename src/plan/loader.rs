// src/plan/loader.rs

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::Result;
use crate::plan::model::TaskPlan;

/// Load a plan from `path`, or from stdin when `path` is `-`.
///
/// This only performs JSON deserialization; structural checks happen when the
/// plan is turned into a [`crate::dag::TaskGraph`].
pub fn load_plan(path: impl AsRef<Path>) -> Result<TaskPlan> {
    let path = path.as_ref();

    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };

    let plan = parse_plan(&contents)?;
    debug!(path = ?path, subtasks = plan.subtasks.len(), "loaded task plan");
    Ok(plan)
}

/// Parse a plan from JSON text.
///
/// Planner output often wraps the JSON in a markdown code fence; a leading
/// ```` ```json ```` line and trailing fence are stripped before parsing.
pub fn parse_plan(text: &str) -> Result<TaskPlan> {
    let plan: TaskPlan = serde_json::from_str(strip_code_fence(text))?;
    Ok(plan)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
