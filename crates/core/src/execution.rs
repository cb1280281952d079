//! Goal execution
//!
//! This module runs the goals of a task segment against a module: planning the
//! goal executions, running their commands, and reporting progress.

pub mod command;
pub mod module_builder;

pub use command::CommandExecutor;
pub use module_builder::LifecycleModuleBuilder;
