use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::plugin::PluginConfig;
use crate::types::ReactorResult;

/// Root `reactor.yml` describing the aggregation root and its modules
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReactorConfig {
    pub name: String,
    pub description: Option<String>,
    /// Whitespace-separated goals/phases used when none are given on the command line
    pub default_goal: Option<String>,
    /// Modules the aggregation root itself depends on
    pub dependencies: Option<Vec<String>>,
    pub modules: Option<Vec<ModuleConfig>>,
    /// Goals bound to lifecycle phases, keyed by phase name
    pub bindings: Option<HashMap<String, Vec<String>>>,
    pub plugins: Option<Vec<PluginConfig>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    /// Module directory relative to the reactor root
    pub path: String,
    pub description: Option<String>,
    pub dependencies: Option<Vec<String>>,
}

pub fn parse_reactor_config(yaml_str: &str) -> ReactorResult<ReactorConfig> {
    let config: ReactorConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reactor_config() {
        let config = parse_reactor_config(
            r#"
name: shop
defaultGoal: clean install
modules:
  - name: core
    path: core
  - name: api
    path: services/api
    dependencies: [core]
bindings:
  compile: ["shell:compile"]
"#,
        )
        .unwrap();

        assert_eq!(config.name, "shop");
        assert_eq!(config.default_goal.as_deref(), Some("clean install"));
        let modules = config.modules.unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].dependencies.as_deref(), Some(&["core".to_string()][..]));
        assert_eq!(config.bindings.unwrap()["compile"], vec!["shell:compile"]);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(parse_reactor_config("name: shop\ntargets: [a]\n").is_err());
    }

    #[test]
    fn test_default_goal_is_only_accepted_on_the_root() {
        let yml = "name: shop\nmodules:\n  - name: core\n    path: core\n    defaultGoal: install\n";
        assert!(parse_reactor_config(yml).is_err());
    }
}
