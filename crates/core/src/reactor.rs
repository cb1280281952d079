//! Reactor host
//!
//! [`Reactor`] is the primary interface for planning and running builds. It loads
//! `reactor.yml`, builds the module graph and plugin registry, and for each build:
//!
//! - prepares the [`BuildSession`] and falls back to the root module's default goal
//! - calculates the task segments and the project build list
//! - validates the goal executions of every segment before anything runs
//! - selects a [`Builder`](crate::builder::Builder) and runs it
//!
//! ## Example
//!
//! ```rust,no_run
//! use reactor_core::reactor::Reactor;
//! use reactor_core::session::ExecutionRequest;
//!
//! # async fn example() -> reactor_core::types::ReactorResult<()> {
//! let reactor = Reactor::load(".")?;
//!
//! let plan = reactor.plan(&ExecutionRequest::with_goals(["clean", "install"]))?;
//! let result = reactor.build(ExecutionRequest::with_goals(["clean", "install"])).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::build_list::ProjectBuildList;
use crate::builder::{create_builder, BuilderKind, ModuleBuilder};
use crate::configs::reactor::{parse_reactor_config, ReactorConfig};
use crate::execution::LifecycleModuleBuilder;
use crate::execution_plan::{ExecutionPlanCalculator, MojoExecution};
use crate::graph::ModuleGraph;
use crate::lifecycle::LifecycleBindings;
use crate::module::{collect_modules, Module};
use crate::plugin::PluginRegistry;
use crate::results::{BuildResult, ReactorContext};
use crate::segment_calculator::{calculate_session_task_segments, requires_project};
use crate::session::{BuildSession, ExecutionRequest};
use crate::status::ReactorBuildStatus;
use crate::task::TaskSegment;
use crate::types::{ReactorError, ReactorResult};

pub const REACTOR_FILE: &str = "reactor.yml";

pub struct Reactor {
    root: PathBuf,
    config: ReactorConfig,
    graph: Arc<ModuleGraph>,
    plugins: Arc<PluginRegistry>,
    bindings: Arc<LifecycleBindings>,
}

/// A task segment with the modules it runs against and the goals it runs on each
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSegment {
    pub segment: TaskSegment,
    pub modules: Vec<String>,
    pub executions: Vec<MojoExecution>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Goals actually planned, after the default-goal fallback
    pub goals: Vec<String>,
    /// Whether the goals given on the request name a lifecycle phase
    pub requires_project: bool,
    pub segments: Vec<PlannedSegment>,
}

impl BuildPlan {
    pub fn task_segments(&self) -> Vec<TaskSegment> {
        self.segments
            .iter()
            .map(|planned| planned.segment.clone())
            .collect()
    }
}

impl Reactor {
    /// Load the reactor rooted at `root` from its `reactor.yml`
    pub fn load(root: impl Into<PathBuf>) -> ReactorResult<Self> {
        let root = root.into();
        let config_path = root.join(REACTOR_FILE);
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            ReactorError::Config(format!(
                "Failed to read reactor config {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config = parse_reactor_config(&content).map_err(|e| {
            ReactorError::Config(format!(
                "Failed to parse reactor config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_config(root, config)
    }

    pub fn from_config(root: PathBuf, config: ReactorConfig) -> ReactorResult<Self> {
        let graph = ModuleGraph::new(collect_modules(&root, &config))?;
        let plugins = PluginRegistry::load(&root, config.plugins.clone().unwrap_or_default())?;
        let bindings = LifecycleBindings::new(config.bindings.clone().unwrap_or_default())?;

        Ok(Self {
            root,
            config,
            graph: Arc::new(graph),
            plugins: Arc::new(plugins),
            bindings: Arc::new(bindings),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// Modules in build order
    pub fn modules(&self) -> &[Module] {
        self.graph.sorted_modules()
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Work out what a build would do without running anything
    pub fn plan(&self, request: &ExecutionRequest) -> ReactorResult<BuildPlan> {
        let session = self.session(request.clone());
        let build_list = ProjectBuildList::new(Arc::clone(&self.graph));
        self.plan_session(&session, &build_list)
    }

    /// Run a build with goals executed by the lifecycle module builder
    pub async fn build(&self, request: ExecutionRequest) -> ReactorResult<BuildResult> {
        let module_builder = Arc::new(LifecycleModuleBuilder::new(
            self.root.clone(),
            Arc::clone(&self.plugins),
            Arc::clone(&self.bindings),
        ));
        self.build_with(request, module_builder).await
    }

    /// Run a build with a custom module builder
    pub async fn build_with(
        &self,
        request: ExecutionRequest,
        module_builder: Arc<dyn ModuleBuilder>,
    ) -> ReactorResult<BuildResult> {
        let kind = BuilderKind::for_request(&request);
        let session = Arc::new(self.session(request));
        let build_list = Arc::new(ProjectBuildList::new(Arc::clone(&self.graph)));
        let plan = self.plan_session(&session, &build_list)?;

        let context = Arc::new(ReactorContext::new());
        let status = Arc::new(ReactorBuildStatus::new());
        let builder = create_builder(kind, module_builder);

        info!(builder = ?kind, modules = build_list.len(), "starting reactor build");
        builder
            .build(
                Arc::clone(&session),
                Arc::clone(&context),
                build_list,
                &plan.task_segments(),
                Arc::clone(&status),
            )
            .await?;

        Ok(BuildResult {
            outcomes: context.outcomes(),
            halted: status.is_halted(),
        })
    }

    fn session(&self, request: ExecutionRequest) -> BuildSession {
        BuildSession::new(request, self.graph.root().clone())
    }

    fn plan_session(
        &self,
        session: &BuildSession,
        build_list: &ProjectBuildList,
    ) -> ReactorResult<BuildPlan> {
        let task_segments = calculate_session_task_segments(session, self.plugins.as_ref())?;
        if task_segments.is_empty() {
            return Err(ReactorError::NoGoalsSpecified);
        }
        let calculator = ExecutionPlanCalculator::new(&self.plugins, &self.bindings);

        let mut segments = Vec::with_capacity(task_segments.len());
        for segment in task_segments {
            let modules = build_list
                .get_by_task_segment(&segment)
                .iter()
                .map(|project| project.module.name.clone())
                .collect();
            let executions = calculator.calculate(&segment)?;
            segments.push(PlannedSegment {
                segment,
                modules,
                executions,
            });
        }

        Ok(BuildPlan {
            goals: session.effective_goals(),
            requires_project: requires_project(session.goals()),
            segments,
        })
    }
}
