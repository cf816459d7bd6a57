// src/engine/runtime.rs

use std::fmt;

use anyhow::anyhow;
use futures::future::join_all;
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::dag::{
    ScheduledTask, Scheduler, StatusSnapshot, TaskGraph, TaskOutcome, Wave, WaveStep,
};
use crate::errors::{Result, WavefrontError};
use crate::exec::{SynthesisRequest, Synthesizer, WorkerInvoker, WorkerRequest};
use crate::plan::{TaskId, TaskPlan};
use crate::types::FailurePolicy;

use super::completion::CompletionTrigger;
use super::core::{LifecycleEvent, RunLifecycle};
use super::{RunEvent, RunReport, RunState, RuntimeOptions};

/// Drives the wavefront scheduler for one run and delegates the actual work
/// to a [`WorkerInvoker`] and a [`Synthesizer`].
///
/// The scheduler decides what runs; this shell only performs IO:
/// - dispatching each wave's worker calls concurrently, bounded by
///   `max_concurrency` and `task_timeout`
/// - waiting for the whole wave before handing the outcomes back
/// - firing synthesis once every task is terminal
pub struct Runtime<W: WorkerInvoker, S: Synthesizer> {
    scheduler: Scheduler,
    lifecycle: RunLifecycle,
    completion: CompletionTrigger,
    worker: W,
    synthesizer: S,
    options: RuntimeOptions,
    original_request: String,
    task_understanding: String,
    limiter: Option<Semaphore>,
    events: Option<mpsc::Sender<RunEvent>>,
}

impl<W: WorkerInvoker, S: Synthesizer> fmt::Debug for Runtime<W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .field("lifecycle", &self.lifecycle)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<W: WorkerInvoker, S: Synthesizer> Runtime<W, S> {
    pub fn new(scheduler: Scheduler, worker: W, synthesizer: S, options: RuntimeOptions) -> Self {
        let limiter = options.max_concurrency.map(|n| Semaphore::new(n.max(1)));
        let completion = CompletionTrigger::new(options.placeholder.clone());

        Self {
            scheduler,
            lifecycle: RunLifecycle::new(),
            completion,
            worker,
            synthesizer,
            options,
            original_request: String::new(),
            task_understanding: String::new(),
            limiter,
            events: None,
        }
    }

    /// Validate `plan` and build a runtime for it.
    pub fn from_plan(
        plan: &TaskPlan,
        original_request: impl Into<String>,
        policy: FailurePolicy,
        worker: W,
        synthesizer: S,
        options: RuntimeOptions,
    ) -> Result<Self> {
        let graph = TaskGraph::from_plan(plan)?;
        let scheduler = Scheduler::new(graph, policy);
        Ok(Self::new(scheduler, worker, synthesizer, options)
            .with_request(original_request, plan.task_understanding.clone()))
    }

    /// Context handed to every worker and to synthesis.
    pub fn with_request(
        mut self,
        original_request: impl Into<String>,
        task_understanding: impl Into<String>,
    ) -> Self {
        self.original_request = original_request.into();
        self.task_understanding = task_understanding.into();
        self
    }

    /// Send [`RunEvent`]s to `tx` as the run progresses.
    ///
    /// The runtime awaits channel capacity, so the receiver must be drained.
    pub fn with_events(mut self, tx: mpsc::Sender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Watch the status store; a new snapshot arrives after every batch.
    pub fn subscribe_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.scheduler.subscribe()
    }

    pub fn state(&self) -> RunState {
        self.lifecycle.state()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Execute the whole run.
    ///
    /// Returns the synthesized answer, or exactly one error (deadlock,
    /// synthesis failure, or a scheduler contract violation).
    pub async fn run(mut self) -> Result<RunReport> {
        info!(
            tasks = self.scheduler.graph().len(),
            policy = %self.scheduler.policy(),
            max_concurrency = ?self.options.max_concurrency,
            task_timeout = ?self.options.task_timeout,
            "wavefront runtime started"
        );

        let result = self.drive().await;

        if let Err(err) = &result {
            error!(error = %err, "run failed");
            if !self.lifecycle.state().is_final() {
                // Already on the error path; a lifecycle error here would
                // only hide the original one.
                let _ = self.transition(LifecycleEvent::Failed).await;
            }
        }

        info!(run_state = %self.lifecycle.state(), "runtime exiting");
        result
    }

    async fn drive(&mut self) -> Result<RunReport> {
        self.transition(LifecycleEvent::PlanAccepted).await?;

        loop {
            if let Some(request) = self.observe_completion() {
                return self.synthesize(request).await;
            }

            match self.scheduler.next_wave()? {
                WaveStep::Dispatch(wave) => {
                    let number = wave.number;
                    self.emit(RunEvent::WaveDispatched {
                        wave: number,
                        tasks: wave.task_ids(),
                    })
                    .await;

                    let outcomes = self.dispatch_wave(wave).await;
                    let step = self.scheduler.complete_wave(outcomes)?;

                    if !step.propagated.is_empty() {
                        warn!(wave = number, tasks = ?step.propagated, "dependents failed by propagation");
                    }
                    let finished = step
                        .completed
                        .iter()
                        .chain(step.failed.iter())
                        .chain(step.propagated.iter());
                    for id in finished {
                        if let Some(status) = self.scheduler.status_of(id) {
                            self.emit(RunEvent::TaskFinished {
                                wave: number,
                                task: id.clone(),
                                status,
                            })
                            .await;
                        }
                    }

                    self.emit(RunEvent::WaveCompleted {
                        wave: number,
                        completed: step.completed,
                        failed: step.failed,
                    })
                    .await;
                }
                WaveStep::Finished => {
                    // The completion check at the top of the loop fires as
                    // soon as everything is terminal.
                    return Err(WavefrontError::Other(anyhow!(
                        "scheduler finished but completion never fired"
                    )));
                }
                WaveStep::Deadlocked { stalled } => {
                    warn!(stalled = ?stalled, "run deadlocked; skipping synthesis");
                    self.emit(RunEvent::Deadlocked {
                        stalled: stalled.clone(),
                    })
                    .await;
                    return Err(WavefrontError::Deadlock {
                        stalled,
                        results: self.scheduler.snapshot().into_results(),
                    });
                }
            }
        }
    }

    fn observe_completion(&mut self) -> Option<SynthesisRequest> {
        let snapshot = self.scheduler.snapshot();
        self.completion.observe(
            self.scheduler.graph(),
            &snapshot,
            &self.original_request,
            &self.task_understanding,
        )
    }

    async fn synthesize(&mut self, request: SynthesisRequest) -> Result<RunReport> {
        self.transition(LifecycleEvent::AllTerminal).await?;

        let answer = self
            .synthesizer
            .synthesize(request)
            .await
            .map_err(|e| WavefrontError::SynthesisFailed(format!("{e:#}")))?;

        self.transition(LifecycleEvent::Synthesized).await?;

        Ok(RunReport {
            answer,
            results: self.scheduler.snapshot().into_results(),
            waves: self.scheduler.wave_history().to_vec(),
        })
    }

    /// Run every task of `wave` concurrently and wait for all of them.
    async fn dispatch_wave(&self, wave: Wave) -> Vec<(TaskId, TaskOutcome)> {
        debug!(wave = wave.number, size = wave.tasks.len(), "dispatching worker calls");
        join_all(wave.tasks.into_iter().map(|t| self.run_task(t))).await
    }

    async fn run_task(&self, scheduled: ScheduledTask) -> (TaskId, TaskOutcome) {
        let id = scheduled.task.id.clone();
        let wave = scheduled.wave;

        // Held until the worker call returns.
        let _permit = match &self.limiter {
            Some(limiter) => match limiter.acquire().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    return (
                        id,
                        TaskOutcome::Failure("concurrency limiter closed".to_string()),
                    );
                }
            },
            None => None,
        };

        debug!(task = %id, wave, "invoking worker");

        let request = WorkerRequest {
            original_request: self.original_request.clone(),
            task_understanding: self.task_understanding.clone(),
            task: scheduled.task,
            dependency_results: scheduled.dependency_results,
        };
        let call = self.worker.invoke(request);

        let result = match self.options.task_timeout {
            Some(limit) => match timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(task = %id, wave, timeout = ?limit, "worker call timed out");
                    Err(anyhow!("worker timed out after {limit:?}"))
                }
            },
            None => call.await,
        };

        let outcome = match result {
            Ok(value) => TaskOutcome::Success(value),
            Err(e) => TaskOutcome::Failure(format!("{e:#}")),
        };
        (id, outcome)
    }

    async fn transition(&mut self, event: LifecycleEvent) -> Result<()> {
        let (from, to) = self.lifecycle.advance(event)?;
        info!(run_state = %to, "run state: {from} -> {to}");
        self.emit(RunEvent::StateChanged { from, to }).await;
        Ok(())
    }

    async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).await.is_err() {
                debug!("run event receiver dropped");
            }
        }
    }
}
