//! Builder strategies
//!
//! A [`Builder`] walks the task segments across the project build list and decides
//! how module builds are scheduled. Two strategies are provided:
//!
//! - [`SingleThreadedBuilder`] builds one module at a time, in build order
//! - [`MultiThreadedBuilder`] builds independent modules of a segment concurrently
//!
//! Both delegate the actual work for one module to a [`ModuleBuilder`] and record
//! every attempted module in the [`ReactorContext`] before moving on.

pub mod multi_threaded;
pub mod single_threaded;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::build_list::ProjectBuildList;
use crate::module::Module;
use crate::results::{BuildSummary, ReactorContext};
use crate::session::{BuildSession, ExecutionRequest, FailurePolicy};
use crate::status::ReactorBuildStatus;
use crate::task::TaskSegment;
use crate::types::{BuildFailure, ReactorResult};

pub use multi_threaded::MultiThreadedBuilder;
pub use single_threaded::SingleThreadedBuilder;

/// Executes one task segment against one module
pub trait ModuleBuilder: Send + Sync {
    fn build_module(
        &self,
        session: &BuildSession,
        context: &ReactorContext,
        module: &Module,
        task_segment: &TaskSegment,
    ) -> Result<(), BuildFailure>;
}

/// Strategy for building the modules of a reactor.
///
/// Module failures are reported through `context` and `status`; an `Err` means the
/// builder itself could not run.
#[async_trait]
pub trait Builder: Send + Sync {
    async fn build(
        &self,
        session: Arc<BuildSession>,
        context: Arc<ReactorContext>,
        build_list: Arc<ProjectBuildList>,
        task_segments: &[TaskSegment],
        status: Arc<ReactorBuildStatus>,
    ) -> ReactorResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    SingleThreaded,
    MultiThreaded { threads: usize },
}

impl BuilderKind {
    pub fn for_request(request: &ExecutionRequest) -> Self {
        if request.threads > 1 {
            BuilderKind::MultiThreaded {
                threads: request.threads,
            }
        } else {
            BuilderKind::SingleThreaded
        }
    }
}

pub fn create_builder(kind: BuilderKind, module_builder: Arc<dyn ModuleBuilder>) -> Box<dyn Builder> {
    match kind {
        BuilderKind::SingleThreaded => Box::new(SingleThreadedBuilder::new(module_builder)),
        BuilderKind::MultiThreaded { threads } => {
            Box::new(MultiThreadedBuilder::new(module_builder, threads))
        }
    }
}

/// Build one module against one segment and record what happened.
///
/// Blacklisted modules are recorded as skipped without being attempted. A failure is
/// recorded and then handled according to the session's [`FailurePolicy`].
pub(crate) fn build_project(
    module_builder: &dyn ModuleBuilder,
    session: &BuildSession,
    context: &ReactorContext,
    build_list: &ProjectBuildList,
    status: &ReactorBuildStatus,
    module: &Module,
    task_segment: &TaskSegment,
) {
    if status.is_blacklisted(&module.name) {
        info!(module = %module.name, "skipping module, a dependency failed");
        context.record(
            &module.name,
            BuildSummary::Skipped {
                reason: "a module it depends on failed".to_string(),
            },
        );
        return;
    }

    let started = Instant::now();
    match module_builder.build_module(session, context, module, task_segment) {
        Ok(()) => context.record(
            &module.name,
            BuildSummary::Success {
                duration: started.elapsed(),
            },
        ),
        Err(failure) => {
            error!(module = %module.name, error = %failure, "module build failed");
            context.record(
                &module.name,
                BuildSummary::Failure {
                    duration: started.elapsed(),
                    error: failure,
                },
            );
            handle_build_error(session.failure_policy(), build_list, status, module);
        }
    }
}

fn handle_build_error(
    policy: FailurePolicy,
    build_list: &ProjectBuildList,
    status: &ReactorBuildStatus,
    module: &Module,
) {
    match policy {
        FailurePolicy::FailFast => status.halt(),
        FailurePolicy::FailAtEnd => {
            let downstream = build_list.downstream(&module.name);
            if !downstream.is_empty() {
                warn!(module = %module.name, skipped = ?downstream, "skipping dependent modules");
            }
            status.blacklist(downstream);
        }
        FailurePolicy::FailNever => {}
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::graph::ModuleGraph;
    use crate::task::{LifecycleTask, Task};

    /// Module builder that records every invocation and fails on chosen modules
    #[derive(Default)]
    pub struct RecordingModuleBuilder {
        pub calls: Mutex<Vec<String>>,
        pub failing: HashSet<String>,
    }

    impl RecordingModuleBuilder {
        pub fn failing_on(modules: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: modules.iter().map(|m| m.to_string()).collect(),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ModuleBuilder for RecordingModuleBuilder {
        fn build_module(
            &self,
            _session: &BuildSession,
            _context: &ReactorContext,
            module: &Module,
            task_segment: &TaskSegment,
        ) -> Result<(), BuildFailure> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}{}", module.name, task_segment));
            if self.failing.contains(&module.name) {
                return Err(BuildFailure::Module {
                    module: module.name.clone(),
                    message: "simulated failure".to_string(),
                });
            }
            Ok(())
        }
    }

    /// root, then a <- b <- c
    pub fn chain_build_list() -> Arc<ProjectBuildList> {
        let graph = ModuleGraph::new(vec![
            Module::new("root", "/r").as_root(),
            Module::new("a", "/r/a"),
            Module::new("b", "/r/b").with_dependencies(["a"]),
            Module::new("c", "/r/c").with_dependencies(["b"]),
        ])
        .unwrap();
        Arc::new(ProjectBuildList::new(Arc::new(graph)))
    }

    pub fn session(policy: FailurePolicy) -> Arc<BuildSession> {
        let request = ExecutionRequest {
            failure_policy: policy,
            ..ExecutionRequest::default()
        };
        Arc::new(BuildSession::new(request, Module::new("root", "/r").as_root()))
    }

    pub fn phase_segment(phase: &str) -> TaskSegment {
        let mut segment = TaskSegment::new(false);
        segment.push(Task::Lifecycle(LifecycleTask::new(phase)));
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_builder_kind_follows_thread_count() {
        let mut request = ExecutionRequest::default();
        assert_eq!(BuilderKind::for_request(&request), BuilderKind::SingleThreaded);

        request.threads = 4;
        assert_eq!(
            BuilderKind::for_request(&request),
            BuilderKind::MultiThreaded { threads: 4 }
        );
    }

    #[test]
    fn test_fail_at_end_blacklists_downstream_modules() {
        let module_builder = RecordingModuleBuilder::failing_on(&["a"]);
        let build_list = chain_build_list();
        let session = session(FailurePolicy::FailAtEnd);
        let context = ReactorContext::new();
        let status = ReactorBuildStatus::new();
        let segment = phase_segment("install");

        for project in build_list.get_by_task_segment(&segment) {
            build_project(
                &module_builder,
                &session,
                &context,
                &build_list,
                &status,
                &project.module,
                &segment,
            );
        }

        assert!(!status.is_halted());
        assert_eq!(module_builder.calls(), vec!["root[install]", "a[install]"]);
        assert!(context.summary("a").unwrap().is_failure());
        assert!(matches!(context.summary("b"), Some(BuildSummary::Skipped { .. })));
        assert!(matches!(context.summary("c"), Some(BuildSummary::Skipped { .. })));
    }

    #[test]
    fn test_fail_fast_halts_the_reactor() {
        let module_builder = RecordingModuleBuilder::failing_on(&["b"]);
        let build_list = chain_build_list();
        let session = session(FailurePolicy::FailFast);
        let context = ReactorContext::new();
        let status = ReactorBuildStatus::new();
        let segment = phase_segment("install");
        let module = Module::new("b", "/r/b");

        build_project(&module_builder, &session, &context, &build_list, &status, &module, &segment);

        assert!(status.is_halted());
        assert!(context.summary("b").unwrap().is_failure());
    }
}
