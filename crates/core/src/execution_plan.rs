//! Per-segment execution plans
//!
//! Expands the tasks of a segment into the ordered goal executions that run for each
//! module. Lifecycle phases expand to every phase of their lifecycle up to the
//! requested one; a phase already covered earlier in the same segment is not run again.

use std::collections::HashMap;

use serde::Serialize;

use crate::lifecycle::{Lifecycle, LifecycleBindings};
use crate::plugin::{MojoDescriptor, PluginRegistry};
use crate::task::{Task, TaskSegment};
use crate::types::ReactorResult;

/// One goal to run, and the phase that pulled it in when it came from a lifecycle
#[derive(Debug, Clone, Serialize)]
pub struct MojoExecution {
    pub mojo: MojoDescriptor,
    pub phase: Option<String>,
}

pub struct ExecutionPlanCalculator<'a> {
    plugins: &'a PluginRegistry,
    bindings: &'a LifecycleBindings,
}

impl<'a> ExecutionPlanCalculator<'a> {
    pub fn new(plugins: &'a PluginRegistry, bindings: &'a LifecycleBindings) -> Self {
        Self { plugins, bindings }
    }

    pub fn calculate(&self, task_segment: &TaskSegment) -> ReactorResult<Vec<MojoExecution>> {
        let mut executions = Vec::new();
        // Highest phase index already scheduled, per lifecycle id
        let mut reached: HashMap<&'static str, usize> = HashMap::new();

        for task in task_segment.tasks() {
            match task {
                Task::Goal(goal) => executions.push(MojoExecution {
                    mojo: self.plugins.get_mojo_descriptor(goal.goal())?,
                    phase: None,
                }),
                Task::Lifecycle(lifecycle_task) => {
                    let lifecycle = Lifecycle::for_phase(lifecycle_task.phase())?;
                    let target = lifecycle.index_of(lifecycle_task.phase()).unwrap_or_default();
                    let start = reached.get(lifecycle.id).map_or(0, |index| index + 1);

                    for phase in lifecycle.phases.iter().take(target + 1).skip(start) {
                        for goal in self.bindings.goals_for(phase) {
                            executions.push(MojoExecution {
                                mojo: self.plugins.get_mojo_descriptor(goal)?,
                                phase: Some(phase.to_string()),
                            });
                        }
                    }

                    if start <= target {
                        reached.insert(lifecycle.id, target);
                    }
                }
            }
        }

        Ok(executions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::plugin::parse_plugin_config;
    use crate::task::{GoalTask, LifecycleTask};
    use crate::types::ReactorError;

    fn plugins() -> PluginRegistry {
        let shell = parse_plugin_config(
            r#"
groupId: org.reactor.plugins
artifactId: shell-plugin
prefix: shell
versions: ["1.0.0"]
goals:
  - name: clean
    command: rm -rf out
  - name: compile
    command: make
  - name: test
    command: make test
  - name: exec
    command: ./run.sh
"#,
        )
        .unwrap();
        PluginRegistry::new(vec![shell]).unwrap()
    }

    fn bindings() -> LifecycleBindings {
        LifecycleBindings::new(HashMap::from([
            ("clean".to_string(), vec!["shell:clean".to_string()]),
            ("compile".to_string(), vec!["shell:compile".to_string()]),
            ("test".to_string(), vec!["shell:test".to_string()]),
        ]))
        .unwrap()
    }

    fn segment(tasks: &[&str]) -> TaskSegment {
        let mut segment = TaskSegment::new(false);
        for task in tasks {
            if task.contains(':') {
                segment.push(Task::Goal(GoalTask::new(*task)));
            } else {
                segment.push(Task::Lifecycle(LifecycleTask::new(*task)));
            }
        }
        segment
    }

    fn goals(executions: &[MojoExecution]) -> Vec<String> {
        executions.iter().map(|e| e.mojo.goal.clone()).collect()
    }

    #[test]
    fn test_phase_runs_every_earlier_bound_phase() {
        let plugins = plugins();
        let bindings = bindings();
        let calculator = ExecutionPlanCalculator::new(&plugins, &bindings);

        let executions = calculator.calculate(&segment(&["clean", "package"])).unwrap();

        assert_eq!(goals(&executions), vec!["clean", "compile", "test"]);
        assert_eq!(executions[1].phase.as_deref(), Some("compile"));
    }

    #[test]
    fn test_phases_are_not_repeated_within_a_segment() {
        let plugins = plugins();
        let bindings = bindings();
        let calculator = ExecutionPlanCalculator::new(&plugins, &bindings);

        let executions = calculator
            .calculate(&segment(&["compile", "shell:exec", "test"]))
            .unwrap();

        assert_eq!(goals(&executions), vec!["compile", "exec", "test"]);
        assert!(executions[1].phase.is_none());
    }

    #[test]
    fn test_unknown_phase_fails_the_plan() {
        let plugins = plugins();
        let bindings = bindings();
        let calculator = ExecutionPlanCalculator::new(&plugins, &bindings);

        assert!(matches!(
            calculator.calculate(&segment(&["compil"])),
            Err(ReactorError::LifecyclePhaseNotFound { .. })
        ));
    }
}
