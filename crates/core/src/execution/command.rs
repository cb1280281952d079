//! Command execution for resolved goals
//!
//! Runs the script, argument list or shell command of a [`MojoDescriptor`] inside a
//! module directory with the `REACTOR_*` environment variables set.

use std::path::{Path, PathBuf};
use std::process::Command;

use colored::*;

use crate::colors::get_module_color;
use crate::execution_plan::MojoExecution;
use crate::module::Module;
use crate::plugin::MojoAction;
use crate::types::BuildFailure;

/// Runs goal commands for one module
pub struct CommandExecutor<'a> {
    reactor_root: &'a Path,
    module: &'a Module,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(reactor_root: &'a Path, module: &'a Module) -> Self {
        Self {
            reactor_root,
            module,
        }
    }

    /// Run one goal execution
    pub fn execute(&self, execution: &MojoExecution) -> Result<(), BuildFailure> {
        let goal = execution.mojo.id();
        let action = execution.mojo.action.as_ref().ok_or_else(|| BuildFailure::GoalFailed {
            module: self.module.name.clone(),
            goal: goal.clone(),
            message: "goal has no script or command to execute".to_string(),
        })?;

        let mut command = match action {
            MojoAction::Script(script) => {
                let script_path = self.resolve_script(script);
                if !script_path.exists() {
                    return Err(self.failure(
                        &goal,
                        format!("script file '{}' not found", script_path.display()),
                    ));
                }
                Command::new(script_path)
            }
            MojoAction::Command(args) => {
                let Some((program, rest)) = args.split_first() else {
                    return Err(self.failure(&goal, "command is empty".to_string()));
                };
                let mut command = Command::new(program);
                command.args(rest);
                command
            }
            MojoAction::Shell(cmd) => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(cmd);
                command
            }
        };

        command
            .current_dir(&self.module.dir)
            .env("REACTOR_ROOT", self.reactor_root)
            .env("REACTOR_MODULE", &self.module.name)
            .env("REACTOR_MODULE_DIR", &self.module.dir)
            .env("REACTOR_GOAL", &goal);
        if let Some(phase) = &execution.phase {
            command.env("REACTOR_PHASE", phase);
        }

        let status = command
            .status()
            .map_err(|e| self.failure(&goal, format!("failed to start: {}", e)))?;

        if !status.success() {
            return Err(self.failure(
                &goal,
                format!("exited with code {}", status.code().unwrap_or(-1)),
            ));
        }

        self.show_completion_message(&execution.mojo.goal);
        Ok(())
    }

    /// Relative scripts resolve against the reactor root
    fn resolve_script(&self, script: &str) -> PathBuf {
        let script_path = PathBuf::from(script);
        if script_path.is_relative() {
            self.reactor_root.join(script_path)
        } else {
            script_path
        }
    }

    fn failure(&self, goal: &str, message: String) -> BuildFailure {
        BuildFailure::GoalFailed {
            module: self.module.name.clone(),
            goal: goal.to_string(),
            message,
        }
    }

    fn show_completion_message(&self, goal: &str) {
        let module_color = get_module_color(&self.module.name);
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("{} completed for {}", goal, self.module.name).color(module_color)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::MojoDescriptor;

    fn execution(action: Option<MojoAction>) -> MojoExecution {
        MojoExecution {
            mojo: MojoDescriptor {
                group_id: "org.x".to_string(),
                artifact_id: "shell".to_string(),
                version: "1".to_string(),
                goal: "exec".to_string(),
                aggregator: false,
                requires_project: true,
                action,
            },
            phase: Some("compile".to_string()),
        }
    }

    #[test]
    fn test_shell_command_runs_in_module_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let module = Module::new("core", temp_dir.path());
        let executor = CommandExecutor::new(temp_dir.path(), &module);

        executor
            .execute(&execution(Some(MojoAction::Shell(
                "echo \"$REACTOR_MODULE:$REACTOR_PHASE\" > marker.txt".to_string(),
            ))))
            .unwrap();

        let marker = std::fs::read_to_string(temp_dir.path().join("marker.txt")).unwrap();
        assert_eq!(marker.trim(), "core:compile");
    }

    #[test]
    fn test_failing_command_reports_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let module = Module::new("core", temp_dir.path());
        let executor = CommandExecutor::new(temp_dir.path(), &module);

        let err = executor
            .execute(&execution(Some(MojoAction::Shell("exit 3".to_string()))))
            .unwrap_err();

        assert_eq!(err.module(), "core");
        assert!(err.to_string().contains("exited with code 3"));
    }

    #[test]
    fn test_missing_script_and_missing_action() {
        let temp_dir = tempfile::tempdir().unwrap();
        let module = Module::new("core", temp_dir.path());
        let executor = CommandExecutor::new(temp_dir.path(), &module);

        let err = executor
            .execute(&execution(Some(MojoAction::Script("scripts/none.sh".to_string()))))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));

        let err = executor.execute(&execution(None)).unwrap_err();
        assert!(err.to_string().contains("no script or command"));
    }
}
