use std::sync::Arc;

use serde::Serialize;

use crate::graph::ModuleGraph;
use crate::module::Module;
use crate::task::TaskSegment;

/// A module together with its position in the reactor build order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSegment {
    pub module: Module,
    pub position: usize,
}

/// The dependency-ordered modules of one build invocation.
///
/// Read-only once constructed; builders share it across workers.
#[derive(Debug, Clone)]
pub struct ProjectBuildList {
    segments: Vec<ProjectSegment>,
    root: usize,
    graph: Arc<ModuleGraph>,
}

impl ProjectBuildList {
    pub fn new(graph: Arc<ModuleGraph>) -> Self {
        let segments: Vec<ProjectSegment> = graph
            .sorted_modules()
            .iter()
            .enumerate()
            .map(|(position, module)| ProjectSegment {
                module: module.clone(),
                position,
            })
            .collect();
        let root = segments
            .iter()
            .position(|segment| segment.module.is_root)
            .unwrap_or_default();

        Self {
            segments,
            root,
            graph,
        }
    }

    /// Modules a task segment runs against: only the aggregation root for an
    /// aggregating segment, every module in build order otherwise
    pub fn get_by_task_segment(&self, task_segment: &TaskSegment) -> Vec<&ProjectSegment> {
        if task_segment.is_aggregating() {
            self.segments.get(self.root).into_iter().collect()
        } else {
            self.segments.iter().collect()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Direct dependencies of a module within this reactor
    pub fn upstream(&self, module: &str) -> Vec<&str> {
        self.graph.upstream(module)
    }

    /// Modules depending on `module`, directly or transitively
    pub fn downstream(&self, module: &str) -> Vec<&str> {
        self.graph.downstream(module)
    }
}
