//! Task model
//!
//! A build invocation is described by an ordered list of goal specifications and
//! lifecycle phase names. Each entry becomes a [`Task`], and runs of tasks that share
//! the same aggregation classification are grouped into a [`TaskSegment`].

use std::fmt;

use serde::Serialize;

/// A single goal requested directly by the user, e.g. `"shell:exec"` or
/// `"org.reactor:docs-plugin:1.0:site"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalTask {
    goal: String,
}

impl GoalTask {
    pub fn new(goal: impl Into<String>) -> Self {
        Self { goal: goal.into() }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }
}

/// A lifecycle phase requested by the user, e.g. `"install"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleTask {
    phase: String,
}

impl LifecycleTask {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
        }
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Task {
    Goal(GoalTask),
    Lifecycle(LifecycleTask),
}

impl Task {
    /// The raw string the task was created from
    pub fn as_str(&self) -> &str {
        match self {
            Task::Goal(task) => task.goal(),
            Task::Lifecycle(task) => task.phase(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered run of tasks that share one aggregation classification.
///
/// Aggregating segments run once against the aggregation root; non-aggregating
/// segments run against every module in the reactor, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSegment {
    tasks: Vec<Task>,
    aggregating: bool,
}

impl TaskSegment {
    pub fn new(aggregating: bool) -> Self {
        Self {
            tasks: Vec::new(),
            aggregating,
        }
    }

    pub fn is_aggregating(&self) -> bool {
        self.aggregating
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    // Only the segment calculator grows a segment.
    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }
}

impl fmt::Display for TaskSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tasks = self
            .tasks
            .iter()
            .map(Task::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if self.aggregating {
            write!(f, "[{}] (aggregating)", tasks)
        } else {
            write!(f, "[{}]", tasks)
        }
    }
}

/// Whether a task string names a goal rather than a lifecycle phase.
///
/// Goal specifications are `"prefix:goal"` or `"groupId:artifactId[:version]:goal"`,
/// so anything containing a colon is a goal.
pub fn is_goal_specification(task: &str) -> bool {
    task.contains(':')
}
