use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::build_list::{ProjectBuildList, ProjectSegment};
use crate::builder::{build_project, Builder, ModuleBuilder};
use crate::results::ReactorContext;
use crate::session::BuildSession;
use crate::status::ReactorBuildStatus;
use crate::task::TaskSegment;
use crate::types::{ReactorError, ReactorResult};

/// Builds the modules of a segment concurrently.
///
/// Segments still run one after another. Within a segment a module is started
/// once every module it depends on has finished, with at most `threads` module
/// builds running at a time.
pub struct MultiThreadedBuilder {
    module_builder: Arc<dyn ModuleBuilder>,
    threads: usize,
}

/// Everything a worker needs, shared across one segment
struct SegmentScope {
    session: Arc<BuildSession>,
    context: Arc<ReactorContext>,
    build_list: Arc<ProjectBuildList>,
    status: Arc<ReactorBuildStatus>,
    task_segment: Arc<TaskSegment>,
}

impl MultiThreadedBuilder {
    pub fn new(module_builder: Arc<dyn ModuleBuilder>, threads: usize) -> Self {
        Self {
            module_builder,
            threads: threads.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    async fn build_segment(&self, scope: SegmentScope) -> ReactorResult<()> {
        let mut pending: Vec<ProjectSegment> = scope
            .build_list
            .get_by_task_segment(&scope.task_segment)
            .into_iter()
            .cloned()
            .collect();
        info!(
            segment = %scope.task_segment,
            modules = ?pending.iter().map(|p| p.module.name.as_str()).collect::<Vec<_>>(),
            threads = self.threads,
            "building task segment"
        );

        let in_segment: HashSet<String> = pending.iter().map(|p| p.module.name.clone()).collect();
        let mut finished: HashSet<String> = HashSet::new();
        let semaphore = Arc::new(Semaphore::new(self.threads));
        let mut running: JoinSet<ReactorResult<String>> = JoinSet::new();

        loop {
            if !scope.status.is_halted() {
                let mut index = 0;
                while index < pending.len() {
                    let ready = scope
                        .build_list
                        .upstream(&pending[index].module.name)
                        .into_iter()
                        .all(|upstream| !in_segment.contains(upstream) || finished.contains(upstream));
                    if ready {
                        let project = pending.remove(index);
                        self.dispatch(&mut running, &semaphore, &scope, project);
                    } else {
                        index += 1;
                    }
                }
            }

            let Some(joined) = running.join_next().await else {
                break;
            };
            let module = joined
                .map_err(|e| ReactorError::Execution(format!("Module build worker failed: {}", e)))??;
            debug!(module = %module, "module finished");
            finished.insert(module);
        }

        if !pending.is_empty() && !scope.status.is_halted() {
            return Err(ReactorError::Execution(format!(
                "Could not schedule modules: {}",
                pending
                    .iter()
                    .map(|p| p.module.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(())
    }

    fn dispatch(
        &self,
        running: &mut JoinSet<ReactorResult<String>>,
        semaphore: &Arc<Semaphore>,
        scope: &SegmentScope,
        project: ProjectSegment,
    ) {
        let semaphore = Arc::clone(semaphore);
        let module_builder = Arc::clone(&self.module_builder);
        let session = Arc::clone(&scope.session);
        let context = Arc::clone(&scope.context);
        let build_list = Arc::clone(&scope.build_list);
        let status = Arc::clone(&scope.status);
        let task_segment = Arc::clone(&scope.task_segment);

        running.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ReactorError::Execution(format!("Worker pool closed: {}", e)))?;

            let module = project.module.name.clone();
            // A halt may have happened while this module waited for a worker
            if status.is_halted() {
                return Ok(module);
            }

            tokio::task::spawn_blocking(move || {
                build_project(
                    module_builder.as_ref(),
                    &session,
                    &context,
                    &build_list,
                    &status,
                    &project.module,
                    &task_segment,
                );
            })
            .await
            .map_err(|e| {
                ReactorError::Execution(format!("Build of module '{}' panicked: {}", module, e))
            })?;

            Ok(module)
        });
    }
}

#[async_trait]
impl Builder for MultiThreadedBuilder {
    async fn build(
        &self,
        session: Arc<BuildSession>,
        context: Arc<ReactorContext>,
        build_list: Arc<ProjectBuildList>,
        task_segments: &[TaskSegment],
        status: Arc<ReactorBuildStatus>,
    ) -> ReactorResult<()> {
        for task_segment in task_segments {
            if status.is_halted() {
                break;
            }

            self.build_segment(SegmentScope {
                session: Arc::clone(&session),
                context: Arc::clone(&context),
                build_list: Arc::clone(&build_list),
                status: Arc::clone(&status),
                task_segment: Arc::new(task_segment.clone()),
            })
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Barrier, Mutex};

    use super::*;
    use crate::builder::test_support::*;
    use crate::graph::ModuleGraph;
    use crate::module::Module;
    use crate::results::BuildSummary;
    use crate::session::FailurePolicy;
    use crate::types::BuildFailure;

    fn position(calls: &[String], module: &str) -> usize {
        calls
            .iter()
            .position(|call| call.starts_with(module))
            .unwrap_or_else(|| panic!("{} was not built", module))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dependencies_finish_before_dependents_start() {
        let module_builder = Arc::new(RecordingModuleBuilder::default());
        let builder = MultiThreadedBuilder::new(module_builder.clone(), 4);
        let context = Arc::new(ReactorContext::new());

        builder
            .build(
                session(FailurePolicy::FailFast),
                context.clone(),
                chain_build_list(),
                &[phase_segment("compile")],
                Arc::new(ReactorBuildStatus::new()),
            )
            .await
            .unwrap();

        let calls = module_builder.calls();
        assert_eq!(calls.len(), 4);
        assert!(position(&calls, "a") < position(&calls, "b"));
        assert!(position(&calls, "b") < position(&calls, "c"));
        assert!(!context.has_failures());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_segments_do_not_overlap() {
        let module_builder = Arc::new(RecordingModuleBuilder::default());
        let builder = MultiThreadedBuilder::new(module_builder.clone(), 4);

        builder
            .build(
                session(FailurePolicy::FailFast),
                Arc::new(ReactorContext::new()),
                chain_build_list(),
                &[phase_segment("clean"), phase_segment("install")],
                Arc::new(ReactorBuildStatus::new()),
            )
            .await
            .unwrap();

        let calls = module_builder.calls();
        assert_eq!(calls.len(), 8);
        assert!(calls[..4].iter().all(|call| call.ends_with("[clean]")));
        assert!(calls[4..].iter().all(|call| call.ends_with("[install]")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fail_fast_stops_dispatching() {
        let module_builder = Arc::new(RecordingModuleBuilder::failing_on(&["a"]));
        let builder = MultiThreadedBuilder::new(module_builder.clone(), 1);
        let context = Arc::new(ReactorContext::new());
        let status = Arc::new(ReactorBuildStatus::new());

        builder
            .build(
                session(FailurePolicy::FailFast),
                context.clone(),
                chain_build_list(),
                &[phase_segment("compile"), phase_segment("install")],
                status.clone(),
            )
            .await
            .unwrap();

        let calls = module_builder.calls();
        assert!(status.is_halted());
        assert!(calls.iter().all(|call| !call.starts_with('b') && !call.starts_with('c')));
        assert!(context.summary("a").unwrap().is_failure());
        assert!(context.summary("b").is_none());
    }

    /// Counts how many module builds overlap
    struct ConcurrencyCounter {
        active: Mutex<usize>,
        peak: Mutex<usize>,
    }

    impl ModuleBuilder for ConcurrencyCounter {
        fn build_module(
            &self,
            _session: &BuildSession,
            _context: &ReactorContext,
            _module: &Module,
            _task_segment: &TaskSegment,
        ) -> Result<(), BuildFailure> {
            {
                let mut active = self.active.lock().unwrap();
                *active += 1;
                let mut peak = self.peak.lock().unwrap();
                *peak = (*peak).max(*active);
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
            *self.active.lock().unwrap() -= 1;
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_thread_limit_is_respected() {
        let graph = ModuleGraph::new(vec![
            Module::new("root", "/r").as_root(),
            Module::new("a", "/r/a"),
            Module::new("b", "/r/b"),
            Module::new("c", "/r/c"),
            Module::new("d", "/r/d"),
        ])
        .unwrap();
        let counter = Arc::new(ConcurrencyCounter {
            active: Mutex::new(0),
            peak: Mutex::new(0),
        });
        let builder = MultiThreadedBuilder::new(counter.clone(), 2);
        let context = Arc::new(ReactorContext::new());

        builder
            .build(
                session(FailurePolicy::FailFast),
                context.clone(),
                Arc::new(ProjectBuildList::new(Arc::new(graph))),
                &[phase_segment("compile")],
                Arc::new(ReactorBuildStatus::new()),
            )
            .await
            .unwrap();

        // Independent modules overlap, but never beyond the thread count
        assert_eq!(*counter.peak.lock().unwrap(), 2);
        assert_eq!(context.outcomes().len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_oversized_thread_count_is_clamped() {
        let module_builder = Arc::new(RecordingModuleBuilder::default());
        let builder = MultiThreadedBuilder::new(module_builder.clone(), usize::MAX);
        let context = Arc::new(ReactorContext::new());

        builder
            .build(
                session(FailurePolicy::FailFast),
                context.clone(),
                chain_build_list(),
                &[phase_segment("compile")],
                Arc::new(ReactorBuildStatus::new()),
            )
            .await
            .unwrap();

        assert_eq!(module_builder.calls().len(), 4);
        assert!(!context.has_failures());
    }

    /// The first module to start fails once a second one is running; later
    /// modules succeed immediately
    struct FailWhileSiblingRuns {
        started: Mutex<Vec<String>>,
        both_running: Barrier,
    }

    impl ModuleBuilder for FailWhileSiblingRuns {
        fn build_module(
            &self,
            _session: &BuildSession,
            _context: &ReactorContext,
            module: &Module,
            _task_segment: &TaskSegment,
        ) -> Result<(), BuildFailure> {
            let order = {
                let mut started = self.started.lock().unwrap();
                started.push(module.name.clone());
                started.len()
            };
            match order {
                1 => {
                    self.both_running.wait();
                    Err(BuildFailure::Module {
                        module: module.name.clone(),
                        message: "simulated failure".to_string(),
                    })
                }
                2 => {
                    self.both_running.wait();
                    std::thread::sleep(std::time::Duration::from_millis(100));
                    Ok(())
                }
                _ => Ok(()),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fail_fast_lets_running_siblings_finish() {
        let graph = ModuleGraph::new(vec![
            Module::new("root", "/r").as_root(),
            Module::new("a", "/r/a"),
            Module::new("b", "/r/b"),
            Module::new("c", "/r/c"),
        ])
        .unwrap();
        let module_builder = Arc::new(FailWhileSiblingRuns {
            started: Mutex::new(Vec::new()),
            both_running: Barrier::new(2),
        });
        let builder = MultiThreadedBuilder::new(module_builder.clone(), 2);
        let context = Arc::new(ReactorContext::new());
        let status = Arc::new(ReactorBuildStatus::new());

        builder
            .build(
                session(FailurePolicy::FailFast),
                context.clone(),
                Arc::new(ProjectBuildList::new(Arc::new(graph))),
                &[phase_segment("compile")],
                status.clone(),
            )
            .await
            .unwrap();

        let started = module_builder.started.lock().unwrap().clone();
        assert!(status.is_halted());
        assert_eq!(started.len(), 2);
        assert!(context.summary(&started[0]).unwrap().is_failure());
        assert!(matches!(
            context.summary(&started[1]),
            Some(BuildSummary::Success { .. })
        ));
        assert_eq!(context.outcomes().len(), 2);
    }
}
