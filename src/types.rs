use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What happens to the dependents of a task that failed.
///
/// - `Halt`: dependents stay `Pending` forever; once nothing else is runnable
///   the run ends with a deadlock error and no synthesis (default).
/// - `Propagate`: every transitive dependent is marked `Failed` right away,
///   independent branches keep running, and synthesis still happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Halt,
    Propagate,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "propagate" => Ok(FailurePolicy::Propagate),
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"halt\" or \"propagate\")"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Halt => f.write_str("halt"),
            FailurePolicy::Propagate => f.write_str("propagate"),
        }
    }
}
