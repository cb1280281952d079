use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::configs::reactor::ReactorConfig;

/// One buildable unit of the reactor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub dir: PathBuf,
    pub dependencies: Vec<String>,
    /// Only the root carries a default goal
    pub default_goal: Option<String>,
    /// The aggregation root, i.e. the module declared by `reactor.yml` itself
    pub is_root: bool,
}

impl Module {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            dependencies: Vec::new(),
            default_goal: None,
            is_root: false,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_goal(mut self, default_goal: impl Into<String>) -> Self {
        self.default_goal = Some(default_goal.into());
        self
    }

    pub fn as_root(mut self) -> Self {
        self.is_root = true;
        self
    }
}

/// Collect the root module and every declared module, in declaration order
pub fn collect_modules(reactor_root: &Path, config: &ReactorConfig) -> Vec<Module> {
    let mut root = Module::new(config.name.clone(), reactor_root.to_path_buf())
        .with_dependencies(config.dependencies.clone().unwrap_or_default())
        .as_root();
    root.default_goal = config.default_goal.clone();

    let mut modules = vec![root];
    for module_config in config.modules.iter().flatten() {
        modules.push(
            Module::new(
                module_config.name.clone(),
                reactor_root.join(&module_config.path),
            )
            .with_dependencies(module_config.dependencies.clone().unwrap_or_default()),
        );
    }
    modules
}
