// tests/graph_validation.rs

mod common;

use wavefront::dag::TaskGraph;
use wavefront::errors::WavefrontError;
use wavefront::plan::TaskPlan;
use wavefront_test_utils::builders::{PlanBuilder, SubtaskBuilder};

use crate::common::{abc_plan, diamond_plan};

fn invalid_plan_message(plan: &TaskPlan) -> String {
    match TaskGraph::from_plan(plan) {
        Err(WavefrontError::InvalidPlan(msg)) => msg,
        other => panic!("expected InvalidPlan, got {other:?}"),
    }
}

#[test]
fn valid_plan_builds_graph_in_plan_order() {
    let graph = TaskGraph::from_plan(&abc_plan()).expect("valid plan");

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.task_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(graph.roots(), vec!["A", "C"]);
    assert_eq!(graph.dependencies_of("B"), ["A".to_string()]);
    assert_eq!(graph.dependents_of("A"), ["B".to_string()]);
    assert!(graph.dependents_of("C").is_empty());
}

#[test]
fn empty_plan_is_rejected() {
    let msg = invalid_plan_message(&PlanBuilder::new().build());
    assert!(msg.contains("at least one subtask"), "{msg}");
}

#[test]
fn unknown_dependency_is_rejected() {
    let plan = PlanBuilder::new()
        .task("A", &[])
        .task("B", &["missing"])
        .build();

    let msg = invalid_plan_message(&plan);
    assert!(msg.contains("unknown dependency 'missing'"), "{msg}");
}

#[test]
fn self_dependency_is_rejected() {
    let plan = PlanBuilder::new().task("A", &["A"]).build();

    let msg = invalid_plan_message(&plan);
    assert!(msg.contains("cannot depend on itself"), "{msg}");
}

#[test]
fn duplicate_and_empty_ids_are_rejected() {
    let dup = PlanBuilder::new().task("A", &[]).task("A", &[]).build();
    assert!(invalid_plan_message(&dup).contains("duplicate subtask id 'A'"));

    let empty = PlanBuilder::new().task("  ", &[]).build();
    assert!(invalid_plan_message(&empty).contains("empty id"));
}

#[test]
fn cycle_is_rejected_up_front() {
    let plan = PlanBuilder::new()
        .task("A", &["C"])
        .task("B", &["A"])
        .task("C", &["B"])
        .task("D", &[])
        .build();

    match TaskGraph::from_plan(&plan) {
        Err(WavefrontError::CyclicDependency { task }) => {
            assert!(["A", "B", "C"].contains(&task.as_str()), "got {task}");
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[test]
fn repeated_dependency_is_counted_once() {
    let plan = PlanBuilder::new()
        .task("A", &[])
        .task("B", &["A", "A"])
        .build();

    let graph = TaskGraph::from_plan(&plan).expect("valid plan");
    assert_eq!(graph.dependencies_of("B").len(), 1);
    assert_eq!(graph.dependents_of("A").len(), 1);
}

#[test]
fn levels_follow_dependencies_then_priority() {
    let graph = TaskGraph::from_plan(&diamond_plan()).expect("valid plan");
    assert_eq!(
        graph.levels(),
        vec![
            vec!["root".to_string()],
            vec!["left".to_string(), "right".to_string()],
            vec!["join".to_string()],
        ]
    );

    let plan = PlanBuilder::new()
        .subtask(SubtaskBuilder::new("low").priority(3).build())
        .subtask(SubtaskBuilder::new("high").priority(1).build())
        .subtask(SubtaskBuilder::new("mid").priority(2).build())
        .build();
    let graph = TaskGraph::from_plan(&plan).expect("valid plan");
    assert_eq!(
        graph.levels(),
        vec![vec!["high".to_string(), "mid".to_string(), "low".to_string()]]
    );
}

#[test]
fn wide_level_keeps_plan_order_within_each_priority() {
    let mut builder = PlanBuilder::new();
    for i in 0..500 {
        let priority = if i % 2 == 0 { 2 } else { 1 };
        builder = builder.subtask(SubtaskBuilder::new(&format!("t{i}")).priority(priority).build());
    }
    let graph = TaskGraph::from_plan(&builder.build()).expect("valid plan");

    assert_eq!(graph.position_of("t0"), 0);
    assert_eq!(graph.position_of("t499"), 499);
    assert_eq!(graph.position_of("missing"), usize::MAX);

    let levels = graph.levels();
    assert_eq!(levels.len(), 1);
    let expected: Vec<String> = (1..500)
        .step_by(2)
        .chain((0..500).step_by(2))
        .map(|i| format!("t{i}"))
        .collect();
    assert_eq!(levels[0], expected);
}

#[test]
fn payload_fields_pass_through_untouched() {
    let plan = PlanBuilder::new()
        .subtask(
            SubtaskBuilder::new("research")
                .title("Research options")
                .description("Compare the candidates")
                .expertise("Data Analyst")
                .priority(2)
                .build(),
        )
        .build();

    let graph = TaskGraph::from_plan(&plan).expect("valid plan");
    let task = graph.task("research").expect("task exists");
    assert_eq!(task.title, "Research options");
    assert_eq!(task.description, "Compare the candidates");
    assert_eq!(task.required_expertise, "Data Analyst");
    assert_eq!(task.priority, 2);
}
