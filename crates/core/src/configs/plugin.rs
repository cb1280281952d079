use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::ReactorResult;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

/// A plugin descriptor, either inline in `reactor.yml` or in `.reactor/plugins/*.yml`
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginConfig {
    pub group_id: String,
    pub artifact_id: String,
    /// Short name used in `prefix:goal` specifications
    pub prefix: Option<String>,
    /// Available versions, oldest first. The last one is used when none is requested.
    pub versions: Vec<String>,
    pub goals: Vec<GoalConfig>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GoalConfig {
    pub name: String,
    pub description: Option<String>,
    /// Runs once from the aggregation root instead of once per module
    pub aggregator: Option<bool>,
    /// Whether the goal needs a concrete module context; defaults to true
    pub requires_project: Option<bool>,
    pub script: Option<String>,
    pub command: Option<Command>,
}

pub fn parse_plugin_config(yaml_str: &str) -> ReactorResult<PluginConfig> {
    let config: PluginConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}
