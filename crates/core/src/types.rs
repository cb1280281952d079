use thiserror::Error;

/// The main error type for Reactor planning and orchestration
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Module graph error: {0}")]
    Graph(String),

    #[error("No goals have been specified for this build and the root module declares no default goal")]
    NoGoalsSpecified,

    #[error("Plugin '{plugin}' could not be found in the reactor")]
    PluginNotFound { plugin: String },

    #[error("Failed to resolve plugin '{plugin}': {message}")]
    PluginResolution { plugin: String, message: String },

    #[error("Failed to parse plugin descriptor '{descriptor}': {message}")]
    DescriptorParse { descriptor: String, message: String },

    #[error("Could not find goal '{goal}' in plugin '{plugin}' among available goals {available:?}")]
    MojoNotFound {
        goal: String,
        plugin: String,
        available: Vec<String>,
    },

    #[error("Error resolving version for plugin '{plugin}': {message}")]
    VersionResolution { plugin: String, message: String },

    #[error("No plugin found for prefix '{prefix}'")]
    PrefixNotFound { prefix: String },

    #[error("Unknown lifecycle phase '{phase}'. Available phases are: {available}")]
    LifecyclePhaseNotFound { phase: String, available: String },

    #[error("Build execution error: {0}")]
    Execution(String),
}

/// Result type alias for Reactor operations
pub type ReactorResult<T> = Result<T, ReactorError>;

/// Failure raised while building a single module against a task segment
#[derive(Debug, Clone, Error)]
pub enum BuildFailure {
    #[error("Failed to execute goal '{goal}' on module '{module}': {message}")]
    GoalFailed {
        module: String,
        goal: String,
        message: String,
    },

    #[error("Module '{module}' could not be built: {message}")]
    Module { module: String, message: String },
}

impl BuildFailure {
    /// Name of the module the failure belongs to
    pub fn module(&self) -> &str {
        match self {
            BuildFailure::GoalFailed { module, .. } | BuildFailure::Module { module, .. } => module,
        }
    }
}
