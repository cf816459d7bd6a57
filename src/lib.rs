// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod types;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate, load_or_default};
use crate::dag::{Scheduler, TaskGraph};
use crate::engine::{RunEvent, Runtime, RuntimeOptions};
use crate::errors::WavefrontError;
use crate::exec::{CommandPlanner, CommandSynthesizer, CommandWorker, Planner};
use crate::plan::{TaskPlan, load_plan};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - obtaining a plan (file/stdin or the planner command)
/// - graph validation
/// - the runtime with command-backed collaborators
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    let plan = obtain_plan(&args, &cfg).await?;
    let graph = TaskGraph::from_plan(&plan)?;

    if args.dry_run {
        print_dry_run(&plan, &graph, &cfg);
        return Ok(());
    }

    let worker = match &cfg.worker {
        Some(c) => CommandWorker::new(c.cmd.clone()),
        None => bail!("no [worker] command configured"),
    };
    let synthesizer = match &cfg.synthesis {
        Some(c) => CommandSynthesizer::new(c.cmd.clone()),
        None => bail!("no [synthesis] command configured"),
    };

    let scheduler = Scheduler::new(graph, cfg.scheduler.failure_policy);
    let (event_tx, event_rx) = mpsc::channel::<RunEvent>(64);
    let runtime = Runtime::new(
        scheduler,
        worker,
        synthesizer,
        RuntimeOptions::from_config(&cfg),
    )
    .with_request(args.request.clone(), plan.task_understanding.clone())
    .with_events(event_tx);

    let logger = tokio::spawn(log_events(event_rx));

    // Dropping the run future kills any worker processes still running.
    let report = tokio::select! {
        result = runtime.run() => result?,
        _ = wait_for_interrupt(tokio::signal::ctrl_c()) => {
            warn!("interrupted; abandoning run");
            bail!("interrupted by Ctrl-C");
        }
    };

    if let Err(e) = logger.await {
        debug!(error = %e, "event logger task ended abnormally");
    }

    info!(waves = report.waves.len(), "run complete");
    println!("{}", report.answer);
    Ok(())
}

/// Load the config file, then apply CLI overrides.
///
/// An explicit `--config` must exist; the default path may be absent.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => load_or_default(default_config_path())?,
    };

    cfg.apply_overrides(&args.scheduler_overrides())?;

    debug!(scheduler = ?cfg.scheduler, "effective scheduler config");
    Ok(cfg)
}

/// Resolves once `signal` reports an interrupt.
///
/// If the listener itself fails (no signal support), this never resolves, so
/// the run it races against keeps going.
pub async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "cannot listen for Ctrl-C; interrupts will not cancel the run");
        std::future::pending::<()>().await;
    }
}

async fn obtain_plan(args: &CliArgs, cfg: &ConfigFile) -> Result<TaskPlan> {
    if let Some(path) = &args.plan {
        let plan =
            load_plan(path).with_context(|| format!("loading plan {}", path.display()))?;
        return Ok(plan);
    }

    let Some(planner_cfg) = &cfg.planner else {
        bail!("no --plan given and no [planner] command configured");
    };

    info!("asking planner for a task plan");
    let planner = CommandPlanner::new(planner_cfg.cmd.clone());
    let plan = planner
        .plan(args.request.clone())
        .await
        .map_err(|e| WavefrontError::PlanningFailed(format!("{e:#}")))?;
    Ok(plan)
}

async fn log_events(mut rx: mpsc::Receiver<RunEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::WaveDispatched { wave, tasks } => {
                info!(wave, "wave {wave} started: {}", tasks.join(", "));
            }
            RunEvent::TaskFinished { wave, task, status } => {
                info!(wave, task = %task, status = %status, "subtask finished");
            }
            RunEvent::WaveCompleted {
                wave,
                completed,
                failed,
            } => {
                info!(
                    wave,
                    completed = completed.len(),
                    failed = failed.len(),
                    "wave {wave} finished"
                );
            }
            RunEvent::Deadlocked { stalled } => {
                warn!("stalled subtasks: {}", stalled.join(", "));
            }
            RunEvent::StateChanged { .. } => {}
        }
    }
}

/// Dry-run output: the plan, its subtasks, and the waves a fully successful
/// run would dispatch.
fn print_dry_run(plan: &TaskPlan, graph: &TaskGraph, cfg: &ConfigFile) {
    println!("wavefront dry-run");
    println!("  goal: {}", plan.task_understanding);
    if !plan.execution_strategy.is_empty() {
        println!("  strategy: {}", plan.execution_strategy);
    }
    println!("  failure_policy = {}", cfg.scheduler.failure_policy);
    match cfg.scheduler.max_concurrency {
        Some(n) => println!("  max_concurrency = {n}"),
        None => println!("  max_concurrency = unbounded"),
    }
    if let Some(t) = cfg.scheduler.task_timeout {
        println!("  task_timeout = {t:?}");
    }
    println!();

    println!("subtasks ({}):", graph.len());
    for task in graph.tasks() {
        println!("  - {} [priority {}]: {}", task.id, task.priority, task.title);
        if !task.required_expertise.is_empty() {
            println!("      expertise: {}", task.required_expertise);
        }
        if !task.dependencies.is_empty() {
            println!("      after: {:?}", task.dependencies);
        }
    }
    println!();

    println!("waves:");
    for (i, level) in graph.levels().iter().enumerate() {
        println!("  {}: {}", i + 1, level.join(", "));
    }

    debug!("dry-run complete (no execution)");
}
