//! Plugin registry and goal resolution
//!
//! Resolves goal specifications (`prefix:goal`, `groupId:artifactId:goal` or
//! `groupId:artifactId:version:goal`) to [`MojoDescriptor`]s. The registry is also
//! the [`GoalClassifier`] used for task segmentation.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::configs::plugin::{parse_plugin_config, Command, GoalConfig, PluginConfig};
use crate::segment_calculator::GoalClassifier;
use crate::types::{ReactorError, ReactorResult};

/// What a resolved goal runs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MojoAction {
    Script(String),
    Command(Vec<String>),
    Shell(String),
}

/// A goal resolved to a concrete plugin version
#[derive(Debug, Clone, Serialize)]
pub struct MojoDescriptor {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub goal: String,
    pub aggregator: bool,
    pub requires_project: bool,
    pub action: Option<MojoAction>,
}

impl MojoDescriptor {
    /// Aggregator goals and goals without a module context run once per build
    pub fn is_aggregating(&self) -> bool {
        self.aggregator || !self.requires_project
    }

    pub fn id(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.goal
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
enum GoalSpec<'a> {
    Prefixed {
        prefix: &'a str,
        goal: &'a str,
    },
    Coordinates {
        group_id: &'a str,
        artifact_id: &'a str,
        version: Option<&'a str>,
        goal: &'a str,
    },
}

fn parse_goal_spec(spec: &str) -> ReactorResult<GoalSpec<'_>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.iter().any(|part| part.trim().is_empty()) {
        return Err(invalid_spec(spec));
    }

    match parts[..] {
        [prefix, goal] => Ok(GoalSpec::Prefixed { prefix, goal }),
        [group_id, artifact_id, goal] => Ok(GoalSpec::Coordinates {
            group_id,
            artifact_id,
            version: None,
            goal,
        }),
        [group_id, artifact_id, version, goal] => Ok(GoalSpec::Coordinates {
            group_id,
            artifact_id,
            version: Some(version),
            goal,
        }),
        _ => Err(invalid_spec(spec)),
    }
}

fn invalid_spec(spec: &str) -> ReactorError {
    ReactorError::DescriptorParse {
        descriptor: spec.to_string(),
        message: "expected 'prefix:goal' or 'groupId:artifactId[:version]:goal'".to_string(),
    }
}

/// All plugins known to the reactor
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginConfig>,
}

impl PluginRegistry {
    pub fn new(plugins: Vec<PluginConfig>) -> ReactorResult<Self> {
        for (index, plugin) in plugins.iter().enumerate() {
            let duplicate = plugins[..index].iter().any(|other| {
                other.group_id == plugin.group_id && other.artifact_id == plugin.artifact_id
            });
            if duplicate {
                return Err(ReactorError::Config(format!(
                    "Plugin '{}:{}' is declared more than once",
                    plugin.group_id, plugin.artifact_id
                )));
            }
        }
        Ok(Self { plugins })
    }

    /// Combine inline plugins with the descriptors in `.reactor/plugins/*.yml`
    pub fn load(reactor_root: &Path, inline: Vec<PluginConfig>) -> ReactorResult<Self> {
        let plugins_dir = reactor_root.join(".reactor").join("plugins");
        let mut plugins = inline;

        if plugins_dir.exists() {
            let mut paths = Vec::new();
            for entry in std::fs::read_dir(&plugins_dir)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) == Some("yml") {
                    paths.push(path);
                }
            }
            paths.sort();

            for path in paths {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ReactorError::PluginResolution {
                        plugin: path.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
                let plugin = parse_plugin_config(&content).map_err(|e| {
                    ReactorError::DescriptorParse {
                        descriptor: path.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
                debug!(plugin = %format!("{}:{}", plugin.group_id, plugin.artifact_id), path = %path.display(), "loaded plugin descriptor");
                plugins.push(plugin);
            }
        }

        Self::new(plugins)
    }

    pub fn plugins(&self) -> &[PluginConfig] {
        &self.plugins
    }

    pub fn get_mojo_descriptor(&self, spec: &str) -> ReactorResult<MojoDescriptor> {
        let (plugin, requested_version, goal) = match parse_goal_spec(spec)? {
            GoalSpec::Prefixed { prefix, goal } => {
                let plugin = self
                    .plugins
                    .iter()
                    .find(|plugin| plugin.prefix.as_deref() == Some(prefix))
                    .ok_or_else(|| ReactorError::PrefixNotFound {
                        prefix: prefix.to_string(),
                    })?;
                (plugin, None, goal)
            }
            GoalSpec::Coordinates {
                group_id,
                artifact_id,
                version,
                goal,
            } => {
                let plugin = self
                    .plugins
                    .iter()
                    .find(|plugin| plugin.group_id == group_id && plugin.artifact_id == artifact_id)
                    .ok_or_else(|| ReactorError::PluginNotFound {
                        plugin: format!("{}:{}", group_id, artifact_id),
                    })?;
                (plugin, version, goal)
            }
        };

        let version = resolve_version(plugin, requested_version)?;
        let goal_config = plugin
            .goals
            .iter()
            .find(|candidate| candidate.name == goal)
            .ok_or_else(|| ReactorError::MojoNotFound {
                goal: goal.to_string(),
                plugin: format!("{}:{}", plugin.group_id, plugin.artifact_id),
                available: plugin.goals.iter().map(|g| g.name.clone()).collect(),
            })?;

        Ok(MojoDescriptor {
            group_id: plugin.group_id.clone(),
            artifact_id: plugin.artifact_id.clone(),
            version,
            goal: goal_config.name.clone(),
            aggregator: goal_config.aggregator.unwrap_or(false),
            requires_project: goal_config.requires_project.unwrap_or(true),
            action: mojo_action(goal_config),
        })
    }
}

fn resolve_version(plugin: &PluginConfig, requested: Option<&str>) -> ReactorResult<String> {
    let plugin_key = format!("{}:{}", plugin.group_id, plugin.artifact_id);
    match requested {
        Some(version) if plugin.versions.iter().any(|v| v == version) => Ok(version.to_string()),
        Some(version) => Err(ReactorError::VersionResolution {
            plugin: plugin_key,
            message: format!(
                "version '{}' is not available, known versions: {}",
                version,
                plugin.versions.join(", ")
            ),
        }),
        None => plugin
            .versions
            .last()
            .cloned()
            .ok_or_else(|| ReactorError::VersionResolution {
                plugin: plugin_key,
                message: "no versions are declared".to_string(),
            }),
    }
}

fn mojo_action(goal: &GoalConfig) -> Option<MojoAction> {
    if let Some(script) = &goal.script {
        return Some(MojoAction::Script(script.clone()));
    }
    match &goal.command {
        Some(Command::Single(cmd)) => Some(MojoAction::Shell(cmd.clone())),
        Some(Command::Multiple(cmds)) if !cmds.is_empty() => Some(MojoAction::Command(cmds.clone())),
        _ => None,
    }
}

impl GoalClassifier for PluginRegistry {
    fn is_aggregating(&self, goal: &str) -> ReactorResult<bool> {
        Ok(self.get_mojo_descriptor(goal)?.is_aggregating())
    }
}
