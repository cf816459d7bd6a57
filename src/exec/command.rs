// src/exec/command.rs

//! Collaborators backed by shell commands.
//!
//! Each call renders a prompt (see [`super::prompt`]), runs the configured
//! command with the prompt on stdin, and takes stdout as the answer. Any
//! command that reads a prompt and prints a reply works, e.g. an LLM CLI.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};

use crate::exec::backend::{Planner, SynthesisRequest, Synthesizer, WorkerInvoker, WorkerRequest};
use crate::exec::prompt::{planning_prompt, synthesis_prompt, worker_prompt};
use crate::exec::task_runner::run_shell_command;
use crate::plan::{TaskPlan, parse_plan};

/// Worker that runs one command per subtask.
///
/// The child also sees `WAVEFRONT_TASK_ID`, `WAVEFRONT_TASK_TITLE` and
/// `WAVEFRONT_EXPERTISE` in its environment.
#[derive(Debug, Clone)]
pub struct CommandWorker {
    cmd: String,
}

impl CommandWorker {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl WorkerInvoker for CommandWorker {
    fn invoke(
        &self,
        request: WorkerRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move {
            let prompt = worker_prompt(&request);
            let task = &request.task;
            let envs = [
                ("WAVEFRONT_TASK_ID", task.id.as_str()),
                ("WAVEFRONT_TASK_TITLE", task.title.as_str()),
                ("WAVEFRONT_EXPERTISE", task.required_expertise.as_str()),
            ];
            let label = format!("subtask '{}'", task.id);
            run_shell_command(&label, &self.cmd, prompt, &envs).await
        })
    }
}

/// Synthesizer that runs one command with the synthesis prompt.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    cmd: String,
}

impl CommandSynthesizer {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move {
            let prompt = synthesis_prompt(&request);
            run_shell_command("synthesis", &self.cmd, prompt, &[]).await
        })
    }
}

/// Planner that runs one command and parses its stdout as a JSON plan.
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    cmd: String,
}

impl CommandPlanner {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Planner for CommandPlanner {
    fn plan(
        &self,
        request: String,
    ) -> Pin<Box<dyn Future<Output = Result<TaskPlan>> + Send + '_>> {
        Box::pin(async move {
            let prompt = planning_prompt(&request);
            let stdout = run_shell_command("planner", &self.cmd, prompt, &[]).await?;
            let plan = parse_plan(&stdout).context("planner output is not a valid task plan")?;
            Ok(plan)
        })
    }
}
