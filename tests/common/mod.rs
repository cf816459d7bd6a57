#![allow(dead_code)]

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use wavefront::engine::RunEvent;
use wavefront::plan::TaskPlan;
pub use wavefront_test_utils::{init_tracing, with_timeout};
use wavefront_test_utils::builders::PlanBuilder;

/// `A` and `C` are independent roots, `B` needs `A`.
pub fn abc_plan() -> TaskPlan {
    PlanBuilder::new()
        .task("A", &[])
        .task("B", &["A"])
        .task("C", &[])
        .build()
}

/// `root -> {left, right} -> join`.
pub fn diamond_plan() -> TaskPlan {
    PlanBuilder::new()
        .task("root", &[])
        .task("left", &["root"])
        .task("right", &["root"])
        .task("join", &["left", "right"])
        .build()
}

/// Event channel whose receiver is drained by a background task; await the
/// handle after the run to get every event in order.
pub fn event_collector() -> (mpsc::Sender<RunEvent>, JoinHandle<Vec<RunEvent>>) {
    let (tx, mut rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    });
    (tx, handle)
}
