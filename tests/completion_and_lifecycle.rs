// tests/completion_and_lifecycle.rs

mod common;

use wavefront::dag::{Scheduler, TaskGraph, TaskOutcome, WaveStep};
use wavefront::engine::{CompletionTrigger, LifecycleEvent, RunLifecycle, RunState};
use wavefront::types::FailurePolicy;

use crate::common::abc_plan;

/// Step the scheduler to the end, completing every task with `"r<id>"`,
/// except `empty_for` which produces `blank`.
fn finished_scheduler(empty_for: &str, blank: &str) -> Scheduler {
    let mut scheduler = Scheduler::new(
        TaskGraph::from_plan(&abc_plan()).unwrap(),
        FailurePolicy::Halt,
    );
    while let WaveStep::Dispatch(wave) = scheduler.next_wave().unwrap() {
        let outcomes = wave
            .tasks
            .iter()
            .map(|t| {
                let value = if t.id() == empty_for {
                    blank.to_string()
                } else {
                    format!("r{}", t.id())
                };
                (t.id().to_string(), TaskOutcome::Success(value))
            })
            .collect();
        scheduler.complete_wave(outcomes).unwrap();
    }
    scheduler
}

#[test]
fn trigger_does_not_fire_before_everything_is_terminal() {
    let mut scheduler = Scheduler::new(
        TaskGraph::from_plan(&abc_plan()).unwrap(),
        FailurePolicy::Halt,
    );
    let mut trigger = CompletionTrigger::new("placeholder");

    assert!(trigger.observe(scheduler.graph(), &scheduler.snapshot(), "q", "goal").is_none());
    scheduler.next_wave().unwrap();
    assert!(trigger.observe(scheduler.graph(), &scheduler.snapshot(), "q", "goal").is_none());
    assert!(!trigger.has_fired());
}

#[test]
fn trigger_fires_exactly_once() {
    let scheduler = finished_scheduler("", "");
    let snapshot = scheduler.snapshot();
    let mut trigger = CompletionTrigger::new("No result generated.");

    let request = trigger
        .observe(scheduler.graph(), &snapshot, "q", "goal")
        .expect("fires once everything is terminal");
    assert_eq!(request.original_request, "q");
    assert_eq!(request.task_understanding, "goal");
    assert_eq!(request.results["A"], "rA");
    assert_eq!(request.results["B"], "rB");
    assert!(trigger.has_fired());

    for _ in 0..3 {
        assert!(trigger.observe(scheduler.graph(), &snapshot, "q", "goal").is_none());
    }
}

#[test]
fn empty_value_gets_placeholder() {
    let scheduler = finished_scheduler("B", "");
    let mut trigger = CompletionTrigger::new("No result generated.");

    let request = trigger
        .observe(scheduler.graph(), &scheduler.snapshot(), "q", "goal")
        .expect("fires");
    assert_eq!(request.results["B"], "No result generated.");
    assert_eq!(request.results["C"], "rC");
}

#[test]
fn whitespace_only_value_also_gets_placeholder() {
    let scheduler = finished_scheduler("A", " \n\t ");
    let mut trigger = CompletionTrigger::new("No result generated.");

    let request = trigger
        .observe(scheduler.graph(), &scheduler.snapshot(), "q", "goal")
        .expect("fires");
    assert_eq!(request.results["A"], "No result generated.");
    assert_eq!(request.results["B"], "rB");
}

#[test]
fn lifecycle_follows_the_happy_path() {
    let mut lifecycle = RunLifecycle::new();
    assert_eq!(lifecycle.state(), RunState::Planning);

    assert_eq!(
        lifecycle.advance(LifecycleEvent::PlanAccepted).unwrap(),
        (RunState::Planning, RunState::Executing)
    );
    lifecycle.advance(LifecycleEvent::AllTerminal).unwrap();
    lifecycle.advance(LifecycleEvent::Synthesized).unwrap();
    assert_eq!(lifecycle.state(), RunState::Done);
    assert!(lifecycle.state().is_final());
}

#[test]
fn lifecycle_rejects_skips_and_leaving_final_states() {
    let mut lifecycle = RunLifecycle::new();
    assert!(lifecycle.advance(LifecycleEvent::Synthesized).is_err());
    assert!(lifecycle.advance(LifecycleEvent::AllTerminal).is_err());
    assert_eq!(lifecycle.state(), RunState::Planning);

    lifecycle.advance(LifecycleEvent::PlanAccepted).unwrap();
    lifecycle.advance(LifecycleEvent::Failed).unwrap();
    assert_eq!(lifecycle.state(), RunState::Errored);

    assert!(lifecycle.advance(LifecycleEvent::Failed).is_err());
    assert!(lifecycle.advance(LifecycleEvent::AllTerminal).is_err());
    assert_eq!(lifecycle.state(), RunState::Errored);
}
