//! Task segment calculation
//!
//! Splits the requested goals and phases into [`TaskSegment`]s. Phases are always
//! non-aggregating; goals are classified by a [`GoalClassifier`]. Consecutive tasks
//! with the same classification share a segment.

use tracing::{debug, info};

use crate::session::BuildSession;
use crate::task::{is_goal_specification, GoalTask, LifecycleTask, Task, TaskSegment};
use crate::types::ReactorResult;

/// Decides whether a goal specification resolves to an aggregating unit of work
pub trait GoalClassifier {
    fn is_aggregating(&self, goal: &str) -> ReactorResult<bool>;
}

impl<F> GoalClassifier for F
where
    F: Fn(&str) -> ReactorResult<bool>,
{
    fn is_aggregating(&self, goal: &str) -> ReactorResult<bool> {
        self(goal)
    }
}

/// Calculate the task segments for a session, falling back to the root module's
/// default goal when the user gave none
pub fn calculate_session_task_segments(
    session: &BuildSession,
    classifier: &dyn GoalClassifier,
) -> ReactorResult<Vec<TaskSegment>> {
    info!(goals = ?session.goals(), "session goals");
    let goals = session.effective_goals();
    if goals.as_slice() != session.goals() {
        info!(goals = ?goals, "using default goal of the root module");
    }
    calculate_task_segments(&goals, classifier)
}

pub fn calculate_task_segments(
    tasks: &[String],
    classifier: &dyn GoalClassifier,
) -> ReactorResult<Vec<TaskSegment>> {
    let mut segments: Vec<TaskSegment> = Vec::with_capacity(tasks.len());

    for task in tasks {
        if is_goal_specification(task) {
            // "prefix:goal" or "groupId:artifactId[:version]:goal"
            let aggregating = classifier.is_aggregating(task)?;
            debug!(goal = %task, aggregating, "classified goal");

            if segments
                .last()
                .map_or(true, |current| current.is_aggregating() != aggregating)
            {
                segments.push(TaskSegment::new(aggregating));
            }
            if let Some(current) = segments.last_mut() {
                current.push(Task::Goal(GoalTask::new(task.as_str())));
            }
        } else {
            // lifecycle phase
            if segments.last().map_or(true, TaskSegment::is_aggregating) {
                segments.push(TaskSegment::new(false));
            }
            if let Some(current) = segments.last_mut() {
                current.push(Task::Lifecycle(LifecycleTask::new(task.as_str())));
            }
        }
    }

    info!(
        segments = %segments.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
        "calculated task segments"
    );
    Ok(segments)
}

/// Whether the requested tasks need a module context, i.e. include at least one phase
pub fn requires_project(goals: &[String]) -> bool {
    goals.iter().any(|goal| !is_goal_specification(goal))
}
