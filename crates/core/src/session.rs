//! Build session and execution request
//!
//! The session carries what a build invocation was asked to do: the raw goals,
//! the aggregation root module and the request options that steer orchestration.

use serde::Serialize;

use crate::module::Module;

/// How the reactor reacts to a module that fails to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the whole build on the first failure
    #[default]
    FailFast,
    /// Keep building, skipping modules that depend on a failed one
    FailAtEnd,
    /// Keep building every module regardless of failures
    FailNever,
}

/// Options for one build invocation
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub goals: Vec<String>,
    pub failure_policy: FailurePolicy,
    /// Number of modules built concurrently; 1 selects the single-threaded builder
    pub threads: usize,
}

impl Default for ExecutionRequest {
    fn default() -> Self {
        Self {
            goals: Vec::new(),
            failure_policy: FailurePolicy::default(),
            threads: 1,
        }
    }
}

impl ExecutionRequest {
    pub fn with_goals<I, S>(goals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            goals: goals.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildSession {
    request: ExecutionRequest,
    top_level_module: Module,
}

impl BuildSession {
    pub fn new(request: ExecutionRequest, top_level_module: Module) -> Self {
        Self {
            request,
            top_level_module,
        }
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// Goals exactly as given by the user
    pub fn goals(&self) -> &[String] {
        &self.request.goals
    }

    pub fn top_level_module(&self) -> &Module {
        &self.top_level_module
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.request.failure_policy
    }

    /// Goals to plan with: the user's goals, or the root module's default goal
    /// split on whitespace when none were given
    pub fn effective_goals(&self) -> Vec<String> {
        if self.request.goals.is_empty() {
            if let Some(default_goal) = self
                .top_level_module
                .default_goal
                .as_deref()
                .filter(|goal| !goal.trim().is_empty())
            {
                return default_goal.split_whitespace().map(str::to_string).collect();
            }
        }
        self.request.goals.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_goal_fallback() {
        let root = Module::new("shop", "/r")
            .as_root()
            .with_default_goal("  clean \t install\n");
        let session = BuildSession::new(ExecutionRequest::default(), root);

        assert_eq!(session.effective_goals(), vec!["clean", "install"]);
    }

    #[test]
    fn test_explicit_goals_win_over_default_goal() {
        let root = Module::new("shop", "/r").as_root().with_default_goal("install");
        let session = BuildSession::new(ExecutionRequest::with_goals(["compile"]), root);

        assert_eq!(session.effective_goals(), vec!["compile"]);
    }

    #[test]
    fn test_blank_default_goal_is_ignored() {
        let root = Module::new("shop", "/r").as_root().with_default_goal("   ");
        let session = BuildSession::new(ExecutionRequest::default(), root);

        assert!(session.effective_goals().is_empty());
    }
}
