// src/engine/core.rs

//! Pure run lifecycle state machine.
//!
//! The runtime feeds it [`LifecycleEvent`]s as the run progresses; the
//! machine rejects anything that does not follow
//! `Planning -> Executing -> AwaitingSynthesis -> Done`, with `Errored`
//! reachable from every non-final state.
//!
//! No Tokio, channels or IO here, so it is trivially unit tested.

use anyhow::anyhow;
use tracing::debug;

use crate::engine::RunState;
use crate::errors::{Result, WavefrontError};

/// Things that move a run forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A validated task graph is available.
    PlanAccepted,
    /// The completion trigger fired.
    AllTerminal,
    /// The synthesizer returned an answer.
    Synthesized,
    /// The run cannot continue.
    Failed,
}

#[derive(Debug)]
pub struct RunLifecycle {
    state: RunState,
}

impl Default for RunLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLifecycle {
    pub fn new() -> Self {
        Self {
            state: RunState::Planning,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Apply `event`, returning `(from, to)` on success.
    pub fn advance(&mut self, event: LifecycleEvent) -> Result<(RunState, RunState)> {
        let from = self.state;
        let to = match (from, event) {
            (RunState::Planning, LifecycleEvent::PlanAccepted) => RunState::Executing,
            (RunState::Executing, LifecycleEvent::AllTerminal) => RunState::AwaitingSynthesis,
            (RunState::AwaitingSynthesis, LifecycleEvent::Synthesized) => RunState::Done,
            (s, LifecycleEvent::Failed) if !s.is_final() => RunState::Errored,
            (s, e) => {
                return Err(WavefrontError::Other(anyhow!(
                    "run lifecycle cannot handle {e:?} while {s}"
                )));
            }
        };

        debug!(run_state = %to, previous = %from, "run state changed");
        self.state = to;
        Ok((from, to))
    }
}
