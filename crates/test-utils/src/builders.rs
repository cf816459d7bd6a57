use wavefront::dag::TaskGraph;
use wavefront::plan::{Subtask, TaskPlan};

/// Builder for `TaskPlan` to simplify test setup.
pub struct PlanBuilder {
    plan: TaskPlan,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            plan: TaskPlan {
                task_understanding: "test goal".to_string(),
                subtasks: Vec::new(),
                execution_strategy: String::new(),
            },
        }
    }

    pub fn understanding(mut self, text: &str) -> Self {
        self.plan.task_understanding = text.to_string();
        self
    }

    /// Add a minimal subtask with the given dependencies.
    pub fn task(mut self, id: &str, deps: &[&str]) -> Self {
        self.plan.subtasks.push(Subtask::new(
            id,
            deps.iter().map(|d| d.to_string()).collect(),
        ));
        self
    }

    pub fn subtask(mut self, task: Subtask) -> Self {
        self.plan.subtasks.push(task);
        self
    }

    /// The plan as built, without validation.
    pub fn build(self) -> TaskPlan {
        self.plan
    }

    /// Validate and build the graph; panics on an invalid plan.
    pub fn build_graph(self) -> TaskGraph {
        TaskGraph::from_plan(&self.plan).expect("builder produced an invalid plan")
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a fully populated `Subtask`.
pub struct SubtaskBuilder {
    task: Subtask,
}

impl SubtaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Subtask::new(id, Vec::new()),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn expertise(mut self, role: &str) -> Self {
        self.task.required_expertise = role.to_string();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn build(self) -> Subtask {
        self.task
    }
}
