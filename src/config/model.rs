// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::DEFAULT_PLACEHOLDER;
use crate::types::FailurePolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [scheduler]
/// max_concurrency = 4
/// task_timeout = "120s"
/// failure_policy = "halt"
///
/// [worker]
/// cmd = "llm -m gpt-4o"
///
/// [synthesis]
/// cmd = "llm -m gpt-4o"
///
/// [planner]
/// cmd = "llm -m gpt-4o"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub scheduler: RawSchedulerSection,

    /// Command answering one subtask per call.
    #[serde(default)]
    pub worker: Option<CommandConfig>,

    /// Command producing the final answer.
    #[serde(default)]
    pub synthesis: Option<CommandConfig>,

    /// Command turning a request into a JSON task plan.
    #[serde(default)]
    pub planner: Option<CommandConfig>,
}

/// `[scheduler]` section, as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSchedulerSection {
    /// Maximum concurrent worker calls; omitted means unbounded.
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Duration string such as `"500ms"`, `"30s"`, `"2m"`.
    #[serde(default)]
    pub task_timeout: Option<String>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Stand-in value for tasks without a result at synthesis time.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for RawSchedulerSection {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            task_timeout: None,
            failure_policy: FailurePolicy::default(),
            placeholder: default_placeholder(),
        }
    }
}

/// `[worker]`, `[synthesis]` and `[planner]` sections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Shell command; the prompt arrives on stdin, the answer is its stdout.
    pub cmd: String,
}

/// Validated configuration.
///
/// Produced via `TryFrom<RawConfigFile>`, so durations are parsed and limits
/// are sane. `Default` is what a missing config file means.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub scheduler: SchedulerSection,
    pub worker: Option<CommandConfig>,
    pub synthesis: Option<CommandConfig>,
    pub planner: Option<CommandConfig>,
}

/// Validated `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSection {
    pub max_concurrency: Option<usize>,
    pub task_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub placeholder: String,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            task_timeout: None,
            failure_policy: FailurePolicy::default(),
            placeholder: default_placeholder(),
        }
    }
}

/// Values that take precedence over the `[scheduler]` section, e.g. CLI flags.
///
/// Checked with the same limits as the file; see [`ConfigFile::apply_overrides`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerOverrides {
    pub max_concurrency: Option<usize>,
    pub task_timeout: Option<Duration>,
    pub failure_policy: Option<FailurePolicy>,
}
