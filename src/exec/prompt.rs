// src/exec/prompt.rs

//! Prompt text handed to the command collaborators on stdin.

use std::fmt::Write;

use crate::exec::backend::{SynthesisRequest, WorkerRequest};

/// Shown for a dependency whose value is missing from the snapshot.
pub const MISSING_DEPENDENCY_RESULT: &str = "No result available.";

/// Prompt for one subtask.
///
/// Dependencies are listed in the order the subtask declares them.
pub fn worker_prompt(req: &WorkerRequest) -> String {
    let task = &req.task;
    let mut out = String::new();

    let role = if task.required_expertise.trim().is_empty() {
        "specialist"
    } else {
        task.required_expertise.as_str()
    };

    let _ = writeln!(
        out,
        "You are a specialized AI agent, an expert {role}. Your task is to execute a specific subtask as part of a larger plan."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Original User Query: \"{}\"", req.original_request);
    let _ = writeln!(out, "Overall Task Goal: \"{}\"", req.task_understanding);
    let _ = writeln!(out);

    if !task.dependencies.is_empty() {
        let _ = writeln!(
            out,
            "You must use the results from the following completed subtasks as context for your work:"
        );
        let _ = writeln!(out);
        for dep in task.dependencies.iter() {
            let value = req
                .dependency_results
                .get(dep)
                .map(String::as_str)
                .unwrap_or(MISSING_DEPENDENCY_RESULT);
            let _ = writeln!(out, "--- RESULT FROM SUBTASK {dep} ---");
            let _ = writeln!(out, "{value}");
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out, "--- YOUR CURRENT SUBTASK ---");
    let _ = writeln!(out, "Title: {}", task.title);
    let _ = writeln!(out, "Description: {}", task.description);
    let _ = writeln!(out);
    let _ = write!(
        out,
        "Execute this subtask now. Provide a concise but complete response that directly fulfills the subtask description. Focus ONLY on your assigned subtask."
    );

    out
}

/// Prompt for the final synthesis, one block per subtask in plan order.
pub fn synthesis_prompt(req: &SynthesisRequest) -> String {
    let blocks: Vec<String> = req
        .tasks
        .iter()
        .map(|t| {
            let value = req
                .results
                .get(&t.id)
                .map(String::as_str)
                .unwrap_or(MISSING_DEPENDENCY_RESULT);
            format!(
                "--- SUBTASK: {} ({}) ---\nRESULT:\n{}",
                t.title, t.required_expertise, value
            )
        })
        .collect();

    format!(
        "You are a world-class AI synthesizer. Your job is to integrate the results from multiple specialized AI agents into a single, cohesive, and comprehensive final response for the user.\n\n\
         Original User Query: \"{}\"\n\
         Overall Task Plan: \"{}\"\n\n\
         The individual subtask results are as follows:\n{}\n\n\
         Synthesize these results into a final, well-structured, and easy-to-read response. Address the user's original query directly. Do not just list the results; integrate them intelligently.",
        req.original_request,
        req.task_understanding,
        blocks.join("\n\n")
    )
}

/// Prompt asking a planner for a JSON task plan.
pub fn planning_prompt(request: &str) -> String {
    format!(
        "You are a world-class AI orchestrator. Your job is to analyze a complex user query and break it down into a structured plan of subtasks. Other specialized AI agents will execute these subtasks.\n\n\
         User Query: \"{request}\"\n\n\
         Respond with JSON only, in this shape:\n\
         {{\"task_understanding\": string, \"subtasks\": [{{\"id\": string, \"title\": string, \"description\": string, \"required_expertise\": string, \"priority\": integer, \"dependencies\": [string]}}], \"execution_strategy\": string}}\n\n\
         Ensure subtask IDs are unique and dependencies are correctly referenced. For the 'required_expertise' field, suggest a specific role for an AI agent. Priority 1 is the highest."
    )
}
