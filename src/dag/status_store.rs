// src/dag/status_store.rs

//! Per-task status table for a single run.
//!
//! The store is owned by the [`crate::dag::Scheduler`]; holding `&mut` to it is
//! what makes somebody the writer. Everybody else reads cloned
//! [`StatusSnapshot`]s, either on demand or through [`StatusStore::subscribe`].

use std::collections::BTreeMap;
use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::dag::task_info::{TaskResult, TaskStatus};
use crate::errors::{Result, WavefrontError};
use crate::plan::TaskId;

/// Immutable copy of the store as of one applied batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    entries: BTreeMap<TaskId, TaskResult>,
    /// Number of batches applied before this snapshot was taken.
    batch: u64,
}

impl StatusSnapshot {
    pub fn get(&self, id: &str) -> Option<&TaskResult> {
        self.entries.get(id)
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.entries.get(id).map(TaskResult::status)
    }

    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &TaskResult)> {
        self.entries.iter()
    }

    /// `true` if every task is `Completed` or `Failed`.
    pub fn all_terminal(&self) -> bool {
        self.entries.values().all(TaskResult::is_terminal)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.entries.values().filter(|r| r.status() == status).count()
    }

    /// Ids currently in `status`, in id order.
    pub fn ids_with_status(&self, status: TaskStatus) -> Vec<TaskId> {
        self.entries
            .iter()
            .filter(|(_, r)| r.status() == status)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn into_results(self) -> BTreeMap<TaskId, TaskResult> {
        self.entries
    }
}

/// Mapping from task id to [`TaskResult`], updated in whole batches.
#[derive(Debug)]
pub struct StatusStore {
    entries: BTreeMap<TaskId, TaskResult>,
    batch: u64,
    tx: watch::Sender<StatusSnapshot>,
}

impl StatusStore {
    /// Create a store with every given task `Pending`.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        let entries: BTreeMap<TaskId, TaskResult> = ids
            .into_iter()
            .map(|id| (id.into(), TaskResult::Pending))
            .collect();

        let (tx, _rx) = watch::channel(StatusSnapshot {
            entries: entries.clone(),
            batch: 0,
        });

        Self {
            entries,
            batch: 0,
            tx,
        }
    }

    pub fn get(&self, id: &str) -> Option<&TaskResult> {
        self.entries.get(id)
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.entries.get(id).map(TaskResult::status)
    }

    pub fn all_terminal(&self) -> bool {
        self.entries.values().all(TaskResult::is_terminal)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            entries: self.entries.clone(),
            batch: self.batch,
        }
    }

    /// Receive a fresh snapshot after every applied batch.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    /// Apply a batch of updates atomically.
    ///
    /// Every transition is checked before anything is written: if one entry
    /// is unknown, repeated, or moves backwards, the whole batch is rejected
    /// and the store is left untouched.
    pub fn apply(&mut self, batch: Vec<(TaskId, TaskResult)>) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (id, next) in batch.iter() {
            let current = self
                .entries
                .get(id)
                .ok_or_else(|| WavefrontError::UnexpectedOutcome(id.clone()))?;

            if !seen.insert(id.as_str()) {
                return Err(WavefrontError::UnexpectedOutcome(id.clone()));
            }

            let (from, to) = (current.status(), next.status());
            if !transition_allowed(from, to) {
                return Err(WavefrontError::InvalidTransition {
                    task: id.clone(),
                    from,
                    to,
                });
            }
        }

        for (id, next) in batch {
            trace!(task = %id, status = %next.status(), "status update");
            self.entries.insert(id, next);
        }
        self.batch += 1;

        debug!(batch = self.batch, "applied status batch");
        self.tx.send_replace(self.snapshot());
        Ok(())
    }
}

/// Forward-only transitions.
///
/// `Pending -> Failed` is how a dependent is failed by propagation; it never
/// passes through `InProgress` because it was never dispatched.
fn transition_allowed(from: TaskStatus, to: TaskStatus) -> bool {
    matches!(
        (from, to),
        (TaskStatus::Pending, TaskStatus::InProgress)
            | (TaskStatus::Pending, TaskStatus::Failed)
            | (TaskStatus::InProgress, TaskStatus::Completed)
            | (TaskStatus::InProgress, TaskStatus::Failed)
    )
}
