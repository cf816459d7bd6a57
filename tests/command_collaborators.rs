// tests/command_collaborators.rs
//
// These spawn real `sh` processes.

#![cfg(unix)]

mod common;

use std::collections::BTreeMap;

use wavefront::exec::prompt::{synthesis_prompt, worker_prompt};
use wavefront::exec::{
    CommandPlanner, CommandSynthesizer, CommandWorker, Planner, SynthesisRequest, Synthesizer,
    WorkerInvoker, WorkerRequest,
};
use wavefront_test_utils::builders::SubtaskBuilder;

use crate::common::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn request_for_b() -> WorkerRequest {
    WorkerRequest {
        original_request: "Which database?".to_string(),
        task_understanding: "Pick a database".to_string(),
        task: SubtaskBuilder::new("B")
            .title("Compare")
            .description("Compare the options")
            .expertise("Database Engineer")
            .after("A")
            .build(),
        dependency_results: BTreeMap::from([("A".to_string(), "Postgres is solid".to_string())]),
    }
}

#[test]
fn worker_prompt_carries_dependencies_and_role() {
    let prompt = worker_prompt(&request_for_b());
    assert!(prompt.contains("an expert Database Engineer"));
    assert!(prompt.contains("Original User Query: \"Which database?\""));
    assert!(prompt.contains("--- RESULT FROM SUBTASK A ---\nPostgres is solid"));
    assert!(prompt.contains("Title: Compare"));

    let mut lonely = request_for_b();
    lonely.dependency_results.clear();
    assert!(worker_prompt(&lonely).contains("No result available."));
}

#[test]
fn synthesis_prompt_lists_tasks_in_plan_order() {
    let request = SynthesisRequest {
        original_request: "q".into(),
        task_understanding: "goal".into(),
        tasks: vec![
            SubtaskBuilder::new("b").title("Second").expertise("Writer").build(),
            SubtaskBuilder::new("a").title("First").expertise("Analyst").build(),
        ],
        results: BTreeMap::from([
            ("a".to_string(), "alpha".to_string()),
            ("b".to_string(), "beta".to_string()),
        ]),
    };

    let prompt = synthesis_prompt(&request);
    let second = prompt.find("--- SUBTASK: Second (Writer) ---\nRESULT:\nbeta").unwrap();
    let first = prompt.find("--- SUBTASK: First (Analyst) ---\nRESULT:\nalpha").unwrap();
    assert!(second < first);
}

#[tokio::test]
async fn worker_command_reads_prompt_and_env() -> TestResult {
    init_tracing();

    let worker = CommandWorker::new(
        "grep -c 'RESULT FROM SUBTASK A' ; printf '%s/%s' \"$WAVEFRONT_TASK_ID\" \"$WAVEFRONT_EXPERTISE\"",
    );
    let out = with_timeout(worker.invoke(request_for_b())).await?;
    assert_eq!(out, "1\nB/Database Engineer");
    Ok(())
}

#[tokio::test]
async fn failing_command_reports_status_and_stderr() {
    let worker = CommandWorker::new("echo 'quota exceeded' >&2; exit 3");
    let err = with_timeout(worker.invoke(request_for_b())).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("status 3"), "{msg}");
    assert!(msg.contains("quota exceeded"), "{msg}");
}

#[tokio::test]
async fn synthesizer_command_returns_trimmed_stdout() -> TestResult {
    let synth = CommandSynthesizer::new("cat > /dev/null; echo '  final answer  '");
    let request = SynthesisRequest {
        original_request: "q".into(),
        task_understanding: "goal".into(),
        tasks: Vec::new(),
        results: BTreeMap::new(),
    };
    let out = with_timeout(synth.synthesize(request)).await?;
    assert_eq!(out, "final answer");
    Ok(())
}

#[tokio::test]
async fn planner_command_output_is_parsed_as_plan() -> TestResult {
    let planner = CommandPlanner::new(
        r#"cat > /dev/null; printf '```json\n{"task_understanding":"t","subtasks":[{"id":"s1"},{"id":"s2","dependencies":["s1"]}]}\n```\n'"#,
    );
    let plan = with_timeout(planner.plan("anything".into())).await?;
    assert_eq!(plan.subtasks.len(), 2);
    assert_eq!(plan.subtasks[1].dependencies, vec!["s1"]);
    Ok(())
}

#[tokio::test]
async fn planner_garbage_is_an_error() {
    let planner = CommandPlanner::new("cat > /dev/null; echo 'I cannot help with that'");
    let err = with_timeout(planner.plan("anything".into())).await.unwrap_err();
    assert!(format!("{err:#}").contains("not a valid task plan"));
}
