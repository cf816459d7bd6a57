// tests/status_store.rs

use wavefront::dag::{StatusStore, TaskResult, TaskStatus};
use wavefront::errors::WavefrontError;

fn store() -> StatusStore {
    StatusStore::new(["a", "b", "c"])
}

#[test]
fn new_store_starts_all_pending() {
    let store = store();
    let snap = store.snapshot();
    assert_eq!(snap.len(), 3);
    assert_eq!(snap.count(TaskStatus::Pending), 3);
    assert!(!snap.all_terminal());
    assert_eq!(snap.batch(), 0);
}

#[test]
fn forward_transitions_are_accepted() {
    let mut store = store();
    store
        .apply(vec![
            ("a".into(), TaskResult::InProgress),
            ("b".into(), TaskResult::InProgress),
            ("c".into(), TaskResult::failed("upstream")),
        ])
        .unwrap();
    store
        .apply(vec![
            ("a".into(), TaskResult::Completed("done".into())),
            ("b".into(), TaskResult::failed("boom")),
        ])
        .unwrap();

    assert!(store.all_terminal());
    assert_eq!(store.get("a"), Some(&TaskResult::Completed("done".into())));
    assert_eq!(store.get("b").and_then(TaskResult::value), Some("Error: boom"));
    assert_eq!(store.snapshot().batch(), 2);
}

#[test]
fn backwards_transition_rejects_whole_batch() {
    let mut store = store();
    store.apply(vec![("a".into(), TaskResult::InProgress)]).unwrap();
    let before = store.snapshot();

    let err = store
        .apply(vec![
            ("b".into(), TaskResult::InProgress),
            ("a".into(), TaskResult::Pending),
        ])
        .unwrap_err();

    match err {
        WavefrontError::InvalidTransition { task, from, to } => {
            assert_eq!(task, "a");
            assert_eq!(from, TaskStatus::InProgress);
            assert_eq!(to, TaskStatus::Pending);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }

    // "b" was valid on its own but must not have been written.
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.status_of("b"), Some(TaskStatus::Pending));
}

#[test]
fn terminal_results_are_final() {
    let mut store = store();
    store.apply(vec![("a".into(), TaskResult::InProgress)]).unwrap();
    store
        .apply(vec![("a".into(), TaskResult::Completed("x".into()))])
        .unwrap();

    for next in [
        TaskResult::InProgress,
        TaskResult::Completed("y".into()),
        TaskResult::failed("late"),
    ] {
        assert!(store.apply(vec![("a".into(), next)]).is_err());
    }
    assert_eq!(store.get("a"), Some(&TaskResult::Completed("x".into())));
}

#[test]
fn pending_cannot_complete_without_running() {
    let mut store = store();
    let err = store
        .apply(vec![("a".into(), TaskResult::Completed("skip".into()))])
        .unwrap_err();
    assert!(matches!(err, WavefrontError::InvalidTransition { .. }));
}

#[test]
fn unknown_or_repeated_ids_are_rejected() {
    let mut store = store();

    let err = store
        .apply(vec![("zzz".into(), TaskResult::InProgress)])
        .unwrap_err();
    assert!(matches!(err, WavefrontError::UnexpectedOutcome(ref id) if id == "zzz"));

    let err = store
        .apply(vec![
            ("a".into(), TaskResult::InProgress),
            ("a".into(), TaskResult::InProgress),
        ])
        .unwrap_err();
    assert!(matches!(err, WavefrontError::UnexpectedOutcome(ref id) if id == "a"));
    assert_eq!(store.status_of("a"), Some(TaskStatus::Pending));
}

#[test]
fn subscribers_only_see_whole_batches() {
    let mut store = store();
    let mut rx = store.subscribe();

    store
        .apply(vec![
            ("a".into(), TaskResult::InProgress),
            ("b".into(), TaskResult::InProgress),
        ])
        .unwrap();

    assert!(rx.has_changed().unwrap());
    let snap = rx.borrow_and_update().clone();
    assert_eq!(snap.batch(), 1);
    assert_eq!(snap.count(TaskStatus::InProgress), 2);

    // A rejected batch publishes nothing.
    let _ = store.apply(vec![("c".into(), TaskResult::Completed("x".into()))]);
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn task_result_serializes_as_tagged_value() {
    let json = serde_json::to_string(&TaskResult::Completed("hi".into())).unwrap();
    assert_eq!(json, r#"{"status":"completed","value":"hi"}"#);

    let json = serde_json::to_string(&TaskResult::Pending).unwrap();
    assert_eq!(json, r#"{"status":"pending"}"#);
}
