// src/engine/completion.rs

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::dag::{StatusSnapshot, TaskGraph};
use crate::exec::SynthesisRequest;
use crate::plan::TaskId;

/// Turns "every task is terminal" into exactly one [`SynthesisRequest`].
///
/// Observing the same finished state again, or any later state, yields
/// `None`. A snapshot with a non-terminal task never fires.
///
/// Tasks without a value get the placeholder. A completed value that is
/// whitespace only also counts as having no value, not just the empty string.
#[derive(Debug)]
pub struct CompletionTrigger {
    placeholder: String,
    fired: bool,
}

impl CompletionTrigger {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            fired: false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn observe(
        &mut self,
        graph: &TaskGraph,
        snapshot: &StatusSnapshot,
        original_request: &str,
        task_understanding: &str,
    ) -> Option<SynthesisRequest> {
        if self.fired {
            debug!("completion already fired; ignoring observation");
            return None;
        }
        if !snapshot.all_terminal() {
            return None;
        }

        self.fired = true;

        let results: BTreeMap<TaskId, String> = graph
            .task_ids()
            .map(|id| {
                let value = snapshot
                    .get(id)
                    .and_then(|r| r.value())
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or(self.placeholder.as_str());
                (id.to_string(), value.to_string())
            })
            .collect();

        info!(tasks = results.len(), "all tasks terminal; requesting synthesis");

        Some(SynthesisRequest {
            original_request: original_request.to_string(),
            task_understanding: task_understanding.to_string(),
            tasks: graph.tasks().cloned().collect(),
            results,
        })
    }
}
