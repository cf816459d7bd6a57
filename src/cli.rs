// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{SchedulerOverrides, parse_duration};
use crate::types::FailurePolicy;

/// Command-line arguments for `wavefront`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wavefront",
    version,
    about = "Split a request into dependent subtasks, run them in concurrent waves, and synthesize one answer.",
    long_about = None
)]
pub struct CliArgs {
    /// The request to answer.
    #[arg(value_name = "REQUEST")]
    pub request: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Wavefront.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read the task plan (JSON) from this file instead of calling the
    /// planner. Use `-` for stdin.
    #[arg(long, value_name = "PATH")]
    pub plan: Option<PathBuf>,

    /// Validate the plan and print its waves without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum concurrent worker calls (overrides the config file).
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Per-call worker timeout such as `30s` or `2m` (overrides the config file).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub task_timeout: Option<Duration>,

    /// What happens to dependents of a failed subtask: `halt` or `propagate`.
    #[arg(long, value_name = "POLICY")]
    pub failure_policy: Option<FailurePolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WAVEFRONT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Flags that override the `[scheduler]` section of the config file.
    pub fn scheduler_overrides(&self) -> SchedulerOverrides {
        SchedulerOverrides {
            max_concurrency: self.max_concurrency,
            task_timeout: self.task_timeout,
            failure_policy: self.failure_policy,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
