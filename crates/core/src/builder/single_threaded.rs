use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::build_list::ProjectBuildList;
use crate::builder::{build_project, Builder, ModuleBuilder};
use crate::results::ReactorContext;
use crate::session::BuildSession;
use crate::status::ReactorBuildStatus;
use crate::task::TaskSegment;
use crate::types::{ReactorError, ReactorResult};

/// Builds modules one after another, segment by segment, each on the blocking pool
pub struct SingleThreadedBuilder {
    module_builder: Arc<dyn ModuleBuilder>,
}

impl SingleThreadedBuilder {
    pub fn new(module_builder: Arc<dyn ModuleBuilder>) -> Self {
        Self { module_builder }
    }
}

#[async_trait]
impl Builder for SingleThreadedBuilder {
    async fn build(
        &self,
        session: Arc<BuildSession>,
        context: Arc<ReactorContext>,
        build_list: Arc<ProjectBuildList>,
        task_segments: &[TaskSegment],
        status: Arc<ReactorBuildStatus>,
    ) -> ReactorResult<()> {
        'segments: for task_segment in task_segments {
            let projects = build_list.get_by_task_segment(task_segment);
            info!(
                segment = %task_segment,
                modules = ?projects.iter().map(|p| p.module.name.as_str()).collect::<Vec<_>>(),
                "building task segment"
            );

            for project in projects {
                if status.is_halted() {
                    break 'segments;
                }

                let module_builder = Arc::clone(&self.module_builder);
                let worker_session = Arc::clone(&session);
                let worker_context = Arc::clone(&context);
                let worker_build_list = Arc::clone(&build_list);
                let worker_status = Arc::clone(&status);
                let module = project.module.clone();
                let segment = task_segment.clone();
                tokio::task::spawn_blocking(move || {
                    build_project(
                        module_builder.as_ref(),
                        &worker_session,
                        &worker_context,
                        &worker_build_list,
                        &worker_status,
                        &module,
                        &segment,
                    );
                })
                .await
                .map_err(|e| {
                    ReactorError::Execution(format!(
                        "Build of module '{}' panicked: {}",
                        project.module.name, e
                    ))
                })?;

                if status.is_halted() {
                    break 'segments;
                }
            }
        }

        Ok(())
    }
}
