use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::Barrier;
use wavefront::exec::{SynthesisRequest, Synthesizer, WorkerInvoker, WorkerRequest};
use wavefront::plan::TaskId;

/// What the fake worker does for one task.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed(String),
    Fail(String),
    /// Sleep, then succeed with the value.
    Delay(Duration, String),
    /// Never return.
    Hang,
}

/// One recorded worker call.
#[derive(Debug, Clone)]
pub struct WorkerCall {
    pub task: TaskId,
    pub dependency_results: BTreeMap<TaskId, String>,
    pub original_request: String,
    pub task_understanding: String,
}

/// A fake worker that:
/// - records every call together with the dependency snapshot it received
/// - tracks how many calls were in flight at once
/// - answers per a script, defaulting to `"result of <id>"`
///
/// Clones share their records, so keep one clone to inspect after the run.
#[derive(Clone, Default)]
pub struct FakeWorker {
    scripts: HashMap<TaskId, Script>,
    calls: Arc<Mutex<Vec<WorkerCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    barrier: Option<Arc<Barrier>>,
}

impl FakeWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, task: &str, script: Script) -> Self {
        self.scripts.insert(task.to_string(), script);
        self
    }

    pub fn fail(self, task: &str, message: &str) -> Self {
        self.script(task, Script::Fail(message.to_string()))
    }

    /// Every call waits until `parties` calls are waiting together.
    ///
    /// With a single wave of `parties` tasks this only completes if they are
    /// really dispatched concurrently.
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<WorkerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_tasks(&self) -> Vec<TaskId> {
        self.calls().into_iter().map(|c| c.task).collect()
    }

    pub fn call_for(&self, task: &str) -> Option<WorkerCall> {
        self.calls().into_iter().find(|c| c.task == task)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the call is dropped mid-way
/// (e.g. by a timeout).
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerInvoker for FakeWorker {
    fn invoke(
        &self,
        request: WorkerRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let id = request.task.id.clone();
        let script = self
            .scripts
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Script::Succeed(format!("result of {id}")));

        Box::pin(async move {
            {
                let mut guard = self.calls.lock().unwrap();
                guard.push(WorkerCall {
                    task: id.clone(),
                    dependency_results: request.dependency_results.clone(),
                    original_request: request.original_request.clone(),
                    task_understanding: request.task_understanding.clone(),
                });
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _in_flight = InFlight(Arc::clone(&self.in_flight));

            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }

            match script {
                Script::Succeed(value) => Ok(value),
                Script::Fail(message) => Err(anyhow!(message)),
                Script::Delay(delay, value) => {
                    tokio::time::sleep(delay).await;
                    Ok(value)
                }
                Script::Hang => std::future::pending::<Result<String>>().await,
            }
        })
    }
}

/// A fake synthesizer that counts calls and keeps the last request.
#[derive(Clone, Default)]
pub struct CountingSynthesizer {
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<SynthesisRequest>>>,
    failure: Option<String>,
}

impl CountingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SynthesisRequest> {
        self.last.lock().unwrap().clone()
    }
}

impl Synthesizer for CountingSynthesizer {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let answer = format!("synthesized {} results", request.results.len());
            *self.last.lock().unwrap() = Some(request);

            match &self.failure {
                Some(message) => Err(anyhow!(message.clone())),
                None => Ok(answer),
            }
        })
    }
}
