//! Lifecycle module builder
//!
//! The [`ModuleBuilder`] used by real builds: expands a task segment into goal
//! executions and runs them in the module directory, stopping at the first failure.

use std::path::PathBuf;
use std::sync::Arc;

use colored::*;
use tracing::debug;

use crate::builder::ModuleBuilder;
use crate::colors::get_module_color;
use crate::execution::command::CommandExecutor;
use crate::execution_plan::ExecutionPlanCalculator;
use crate::lifecycle::LifecycleBindings;
use crate::module::Module;
use crate::plugin::PluginRegistry;
use crate::results::ReactorContext;
use crate::session::BuildSession;
use crate::task::TaskSegment;
use crate::types::BuildFailure;

pub struct LifecycleModuleBuilder {
    reactor_root: PathBuf,
    plugins: Arc<PluginRegistry>,
    bindings: Arc<LifecycleBindings>,
}

impl LifecycleModuleBuilder {
    pub fn new(
        reactor_root: PathBuf,
        plugins: Arc<PluginRegistry>,
        bindings: Arc<LifecycleBindings>,
    ) -> Self {
        Self {
            reactor_root,
            plugins,
            bindings,
        }
    }
}

impl ModuleBuilder for LifecycleModuleBuilder {
    fn build_module(
        &self,
        _session: &BuildSession,
        _context: &ReactorContext,
        module: &Module,
        task_segment: &TaskSegment,
    ) -> Result<(), BuildFailure> {
        let executions = ExecutionPlanCalculator::new(&self.plugins, &self.bindings)
            .calculate(task_segment)
            .map_err(|e| BuildFailure::Module {
                module: module.name.clone(),
                message: e.to_string(),
            })?;

        let module_color = get_module_color(&module.name);
        println!();
        println!(
            "┌─ {} {}",
            "Building".bold(),
            module.name.color(module_color).bold()
        );
        println!("└─ {} {}", "Tasks:".bright_black(), task_segment);

        let executor = CommandExecutor::new(&self.reactor_root, module);
        for execution in &executions {
            debug!(module = %module.name, goal = %execution.mojo.id(), phase = ?execution.phase, "executing goal");
            executor.execute(execution)?;
        }

        Ok(())
    }
}
