use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::anyhow;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::{SchedulerStep, WaveStep};
use crate::dag::status_store::{StatusSnapshot, StatusStore};
use crate::dag::task_info::{ScheduledTask, TaskOutcome, TaskResult, TaskStatus, Wave};
use crate::errors::{Result, WavefrontError};
use crate::plan::TaskId;
use crate::types::FailurePolicy;

/// Scheduler holds the immutable graph plus the mutable status of one run.
///
/// It is responsible for:
/// - computing the ready set (tasks whose dependencies all `Completed`)
/// - marking a wave `InProgress` before it is dispatched
/// - capturing each task's dependency snapshot at wave start
/// - merging a finished wave's outcomes as one batch
/// - reporting deadlock when tasks remain but none can run
///
/// It performs no IO; [`crate::engine::Runtime`] drives it.
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    store: StatusStore,
    policy: FailurePolicy,
    /// Tasks not yet terminal. Only ever shrinks.
    remaining: HashSet<TaskId>,
    wave_counter: u64,
    /// Members of the wave that has been dispatched but not merged yet.
    in_flight: Option<(u64, HashSet<TaskId>)>,
    history: Vec<Vec<TaskId>>,
}

impl Scheduler {
    pub fn new(graph: TaskGraph, policy: FailurePolicy) -> Self {
        let store = StatusStore::new(graph.task_ids().map(str::to_string));
        let remaining = graph.task_ids().map(str::to_string).collect();

        Self {
            graph,
            store,
            policy,
            remaining,
            wave_counter: 0,
            in_flight: None,
            history: Vec::new(),
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Read-only access to the status store.
    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.store.subscribe()
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.store.status_of(id)
    }

    /// Ids not yet terminal, in plan order.
    pub fn remaining(&self) -> Vec<TaskId> {
        self.graph
            .task_ids()
            .filter(|id| self.remaining.contains(*id))
            .map(str::to_string)
            .collect()
    }

    /// `true` once every task is terminal.
    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Task ids of every wave dispatched so far.
    pub fn wave_history(&self) -> &[Vec<TaskId>] {
        &self.history
    }

    /// Whether every dependency of `task` is `Completed`.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(
            self.graph
                .dependencies_of(task)
                .iter()
                .all(|dep| self.store.status_of(dep) == Some(TaskStatus::Completed)),
        )
    }

    /// Tasks that would be dispatched by the next call to
    /// [`Scheduler::next_wave`], in dispatch order.
    pub fn ready_set(&self) -> Vec<TaskId> {
        let mut ready: Vec<TaskId> = self
            .remaining
            .iter()
            .filter(|id| self.store.status_of(id) == Some(TaskStatus::Pending))
            .filter(|id| self.deps_satisfied(id).unwrap_or(false))
            .cloned()
            .collect();
        self.graph.sort_by_priority(&mut ready);
        ready
    }

    /// Compute the next wave and mark it `InProgress`.
    ///
    /// Must not be called while a previous wave is still in flight.
    pub fn next_wave(&mut self) -> Result<WaveStep> {
        if let Some((number, _)) = &self.in_flight {
            return Err(WavefrontError::Other(anyhow!(
                "wave {} is still in flight; merge its outcomes first",
                number
            )));
        }

        if self.remaining.is_empty() {
            return Ok(WaveStep::Finished);
        }

        let ready = self.ready_set();
        if ready.is_empty() {
            let stalled = self.remaining();
            warn!(
                stalled = ?stalled,
                "no runnable task while tasks remain; cyclic or failed dependency"
            );
            return Ok(WaveStep::Deadlocked { stalled });
        }

        // Snapshot dependency values before touching the store, so every
        // member of this wave sees exactly the results of earlier waves.
        let tasks: Vec<ScheduledTask> = ready
            .iter()
            .filter_map(|id| self.graph.task(id))
            .map(|task| ScheduledTask {
                dependency_results: self.dependency_results_for(&task.id),
                task: task.clone(),
                wave: self.wave_counter + 1,
            })
            .collect();

        self.store.apply(
            ready
                .iter()
                .map(|id| (id.clone(), TaskResult::InProgress))
                .collect(),
        )?;

        self.wave_counter += 1;
        let number = self.wave_counter;
        info!(wave = number, tasks = ?ready, "dispatching wave");

        self.in_flight = Some((number, ready.iter().cloned().collect()));
        self.history.push(ready);

        Ok(WaveStep::Dispatch(Wave { number, tasks }))
    }

    /// Merge the outcomes of the in-flight wave as one batch.
    ///
    /// A wave member without an outcome is recorded as failed; an outcome for
    /// a task outside the wave is rejected.
    pub fn complete_wave(&mut self, outcomes: Vec<(TaskId, TaskOutcome)>) -> Result<SchedulerStep> {
        let (wave, members) = self.in_flight.take().ok_or_else(|| {
            WavefrontError::Other(anyhow!("complete_wave called with no wave in flight"))
        })?;

        let mut by_id: HashMap<TaskId, TaskOutcome> = HashMap::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            if !members.contains(&id) || by_id.contains_key(&id) {
                self.in_flight = Some((wave, members));
                return Err(WavefrontError::UnexpectedOutcome(id));
            }
            by_id.insert(id, outcome);
        }

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        let mut batch: Vec<(TaskId, TaskResult)> = Vec::with_capacity(members.len());

        // Plan order keeps logs and step fields deterministic.
        let ordered: Vec<TaskId> = self
            .graph
            .task_ids()
            .filter(|id| members.contains(*id))
            .map(str::to_string)
            .collect();

        for id in ordered {
            let outcome = by_id.remove(&id).unwrap_or_else(|| {
                warn!(task = %id, wave, "no outcome reported; recording failure");
                TaskOutcome::Failure("worker produced no outcome".to_string())
            });

            match &outcome {
                TaskOutcome::Success(_) => {
                    debug!(task = %id, wave, "task completed");
                    completed.push(id.clone());
                }
                TaskOutcome::Failure(message) => {
                    warn!(task = %id, wave, error = %message, "task failed");
                    failed.push(id.clone());
                }
            }
            batch.push((id, outcome.into()));
        }

        let propagated = match self.policy {
            FailurePolicy::Halt => Vec::new(),
            FailurePolicy::Propagate => self.propagate_failures(&failed, &mut batch),
        };

        self.store.apply(batch)?;

        for id in completed.iter().chain(failed.iter()).chain(propagated.iter()) {
            self.remaining.remove(id);
        }

        let all_terminal = self.remaining.is_empty();
        if all_terminal {
            info!(wave, "all tasks terminal");
        }

        Ok(SchedulerStep {
            wave,
            completed,
            failed,
            propagated,
            all_terminal,
        })
    }

    /// Values of `task`'s dependencies as currently stored.
    fn dependency_results_for(&self, task: &str) -> BTreeMap<TaskId, String> {
        self.graph
            .dependencies_of(task)
            .iter()
            .filter_map(|dep| {
                self.store
                    .get(dep)
                    .and_then(TaskResult::value)
                    .map(|v| (dep.clone(), v.to_string()))
            })
            .collect()
    }

    /// Mark every pending transitive dependent of `failed` as failed, adding
    /// the updates to `batch`. Returns the affected ids.
    fn propagate_failures(
        &self,
        failed: &[TaskId],
        batch: &mut Vec<(TaskId, TaskResult)>,
    ) -> Vec<TaskId> {
        let mut marked: HashSet<TaskId> = HashSet::new();
        let mut propagated = Vec::new();

        for root in failed {
            let mut stack: Vec<TaskId> = self.graph.dependents_of(root).to_vec();

            while let Some(id) = stack.pop() {
                if marked.contains(&id) || self.store.status_of(&id) != Some(TaskStatus::Pending) {
                    continue;
                }

                debug!(task = %id, upstream = %root, "failing dependent of failed task");
                marked.insert(id.clone());
                batch.push((
                    id.clone(),
                    TaskResult::failed(format!("dependency '{root}' failed")),
                ));
                stack.extend(self.graph.dependents_of(&id).iter().cloned());
                propagated.push(id);
            }
        }

        propagated
    }
}
