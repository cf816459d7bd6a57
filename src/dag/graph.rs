// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use crate::errors::Result;
use crate::plan::{Subtask, TaskId, TaskPlan};

/// Internal node structure: the subtask plus immediate deps and dependents.
#[derive(Debug, Clone)]
struct TaskNode {
    task: Subtask,
    /// Index in the plan; ties in priority ordering fall back to this.
    position: usize,
    /// Direct dependencies, deduplicated, in the order the plan listed them.
    deps: Vec<TaskId>,
    /// Direct dependents, in plan order.
    dependents: Vec<TaskId>,
}

/// Immutable dependency graph for one run.
///
/// Construct it with [`TaskGraph::from_plan`] (or `TryFrom<&TaskPlan>`), which
/// validates ids, references and acyclicity first; after that the graph is
/// never mutated.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// Task ids in plan order.
    order: Vec<TaskId>,
    nodes: HashMap<TaskId, TaskNode>,
}

impl TaskGraph {
    /// Validate `plan` and build the graph.
    pub fn from_plan(plan: &TaskPlan) -> Result<Self> {
        Self::try_from(plan)
    }

    /// Build without validation.
    ///
    /// Unknown dependencies are kept as edges that can never be satisfied and
    /// cycles are kept as-is; a scheduler driving such a graph ends in a
    /// deadlock instead of failing up front.
    pub fn new_unchecked(plan: &TaskPlan) -> Self {
        let mut nodes: HashMap<TaskId, TaskNode> = HashMap::new();
        let mut order = Vec::with_capacity(plan.subtasks.len());

        // First pass: nodes with their (deduplicated) dependency lists.
        for (position, st) in plan.subtasks.iter().enumerate() {
            let mut seen = HashSet::new();
            let deps = st
                .dependencies
                .iter()
                .filter(|d| seen.insert(d.as_str()))
                .cloned()
                .collect();
            order.push(st.id.clone());
            nodes.insert(
                st.id.clone(),
                TaskNode {
                    task: st.clone(),
                    position,
                    deps,
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: dependents, walking in plan order so they stay ordered.
        for id in order.iter() {
            let deps = nodes.get(id).map(|n| n.deps.clone()).unwrap_or_default();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(id.clone());
                }
            }
        }

        Self { order, nodes }
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All task ids in plan order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// All subtasks in plan order.
    pub fn tasks(&self) -> impl Iterator<Item = &Subtask> {
        self.order.iter().filter_map(|id| self.nodes.get(id).map(|n| &n.task))
    }

    pub fn task(&self, id: &str) -> Option<&Subtask> {
        self.nodes.get(id).map(|n| &n.task)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one as a dependency).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks with no dependencies, in plan order.
    pub fn roots(&self) -> Vec<&str> {
        self.task_ids()
            .filter(|id| self.dependencies_of(id).is_empty())
            .collect()
    }

    /// Position of a task in the plan, used as a stable tie-breaker.
    ///
    /// Unknown ids sort last.
    pub fn position_of(&self, id: &str) -> usize {
        self.nodes.get(id).map_or(usize::MAX, |n| n.position)
    }

    /// Wave layering a run would follow if every task succeeded.
    ///
    /// Each level holds the tasks whose dependencies all sit in earlier
    /// levels, ordered by priority then plan order.
    pub fn levels(&self) -> Vec<Vec<TaskId>> {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&str> = self.task_ids().collect();
        let mut levels = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&str>, Vec<&str>) = remaining
                .into_iter()
                .partition(|id| self.dependencies_of(id).iter().all(|d| placed.contains(d.as_str())));

            if ready.is_empty() {
                // Only reachable on an unvalidated cyclic graph.
                break;
            }

            let mut level: Vec<TaskId> = ready.iter().map(|s| s.to_string()).collect();
            self.sort_by_priority(&mut level);
            placed.extend(ready);
            levels.push(level);
            remaining = blocked;
        }

        levels
    }

    /// Order ids by `priority` (1 first), then plan order.
    pub(crate) fn sort_by_priority(&self, ids: &mut [TaskId]) {
        ids.sort_by_key(|id| match self.nodes.get(id.as_str()) {
            Some(node) => (node.task.priority, node.position),
            None => (i64::MAX, usize::MAX),
        });
    }
}
