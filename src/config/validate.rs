// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    CommandConfig, ConfigFile, RawConfigFile, RawSchedulerSection, SchedulerOverrides,
    SchedulerSection,
};
use crate::errors::{Result, WavefrontError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WavefrontError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let scheduler = validate_scheduler(raw.scheduler)?;
        validate_command("worker", raw.worker.as_ref())?;
        validate_command("synthesis", raw.synthesis.as_ref())?;
        validate_command("planner", raw.planner.as_ref())?;

        Ok(ConfigFile {
            scheduler,
            worker: raw.worker,
            synthesis: raw.synthesis,
            planner: raw.planner,
        })
    }
}

impl ConfigFile {
    /// Apply `overrides` on top of the loaded file.
    ///
    /// Rejects the values the file itself may not contain; `self` is left
    /// untouched on error.
    pub fn apply_overrides(&mut self, overrides: &SchedulerOverrides) -> Result<()> {
        if let Some(n) = overrides.max_concurrency {
            check_max_concurrency("--max-concurrency", n)?;
        }
        if let Some(t) = overrides.task_timeout {
            check_task_timeout("--task-timeout", t)?;
        }

        if let Some(n) = overrides.max_concurrency {
            self.scheduler.max_concurrency = Some(n);
        }
        if let Some(t) = overrides.task_timeout {
            self.scheduler.task_timeout = Some(t);
        }
        if let Some(p) = overrides.failure_policy {
            self.scheduler.failure_policy = p;
        }
        Ok(())
    }
}

fn validate_scheduler(raw: RawSchedulerSection) -> Result<SchedulerSection> {
    if let Some(n) = raw.max_concurrency {
        check_max_concurrency("[scheduler].max_concurrency", n)?;
    }

    let task_timeout = raw
        .task_timeout
        .as_deref()
        .map(|s| {
            parse_duration(s).map_err(|e| {
                WavefrontError::ConfigError(format!("[scheduler].task_timeout: {e}"))
            })
        })
        .transpose()?;

    if let Some(t) = task_timeout {
        check_task_timeout("[scheduler].task_timeout", t)?;
    }

    Ok(SchedulerSection {
        max_concurrency: raw.max_concurrency,
        task_timeout,
        failure_policy: raw.failure_policy,
        placeholder: raw.placeholder,
    })
}

fn check_max_concurrency(field: &str, n: usize) -> Result<()> {
    if n == 0 {
        return Err(WavefrontError::ConfigError(format!(
            "{field} must be >= 1 (got 0)"
        )));
    }
    Ok(())
}

fn check_task_timeout(field: &str, t: Duration) -> Result<()> {
    if t.is_zero() {
        return Err(WavefrontError::ConfigError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

fn validate_command(section: &str, cmd: Option<&CommandConfig>) -> Result<()> {
    if let Some(c) = cmd {
        if c.cmd.trim().is_empty() {
            return Err(WavefrontError::ConfigError(format!(
                "[{section}].cmd must not be empty"
            )));
        }
    }
    Ok(())
}

/// Parse durations like `"500ms"`, `"30s"`, `"2m"`, `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

    match unit_part.trim().to_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        "h" => Ok(Duration::from_secs(value.saturating_mul(3600))),
        unit => Err(format!(
            "unsupported duration unit '{unit}'; expected ms, s, m, or h"
        )),
    }
}
