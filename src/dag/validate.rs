// src/dag/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::TaskGraph;
use crate::errors::{Result, WavefrontError};
use crate::plan::TaskPlan;

impl TryFrom<&TaskPlan> for TaskGraph {
    type Error = WavefrontError;

    fn try_from(plan: &TaskPlan) -> std::result::Result<Self, Self::Error> {
        validate_plan(plan)?;
        Ok(TaskGraph::new_unchecked(plan))
    }
}

/// Structural validation of a plan.
///
/// This checks:
/// - there is at least one subtask
/// - ids are non-empty and unique
/// - every dependency refers to an existing subtask
/// - no subtask depends on itself
/// - the dependency graph has no cycles
pub fn validate_plan(plan: &TaskPlan) -> Result<()> {
    ensure_has_subtasks(plan)?;
    validate_ids(plan)?;
    validate_dependencies(plan)?;
    validate_acyclic(plan)?;
    Ok(())
}

fn ensure_has_subtasks(plan: &TaskPlan) -> Result<()> {
    if plan.subtasks.is_empty() {
        return Err(WavefrontError::InvalidPlan(
            "plan must contain at least one subtask".to_string(),
        ));
    }
    Ok(())
}

fn validate_ids(plan: &TaskPlan) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, st) in plan.subtasks.iter().enumerate() {
        if st.id.trim().is_empty() {
            return Err(WavefrontError::InvalidPlan(format!(
                "subtask at position {} has an empty id",
                idx
            )));
        }
        if !seen.insert(st.id.as_str()) {
            return Err(WavefrontError::InvalidPlan(format!(
                "duplicate subtask id '{}'",
                st.id
            )));
        }
    }
    Ok(())
}

fn validate_dependencies(plan: &TaskPlan) -> Result<()> {
    let ids: HashSet<&str> = plan.subtasks.iter().map(|s| s.id.as_str()).collect();

    for st in plan.subtasks.iter() {
        for dep in st.dependencies.iter() {
            if dep == &st.id {
                return Err(WavefrontError::InvalidPlan(format!(
                    "subtask '{}' cannot depend on itself",
                    st.id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(WavefrontError::InvalidPlan(format!(
                    "subtask '{}' has unknown dependency '{}'",
                    st.id, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(plan: &TaskPlan) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for st in plan.subtasks.iter() {
        graph.add_node(st.id.as_str());
    }

    for st in plan.subtasks.iter() {
        for dep in st.dependencies.iter() {
            graph.add_edge(dep.as_str(), st.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(WavefrontError::CyclicDependency {
            task: cycle.node_id().to_string(),
        }),
    }
}
