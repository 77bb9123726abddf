// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! This module handles the configuration an editor host hands to the engine.
//!
//! ## Configuration Sources
//!
//! The same [`EngineConfig`] can be loaded from:
//! - JSON (client settings payloads)
//! - YAML (workspace configuration files)
//!
//! Every field has a default, so a partial document is valid input.
//!
//! ## Example
//!
//! ```yaml
//! dialect: azure_sql
//! connection:
//!   connection_id: reporting
//!   default_database: Sales
//! completion:
//!   max_items: 50
//! actions:
//!   - id: select-top
//!     title: Select top 100 rows
//!     object_kinds: [table, view]
//!     query: "SELECT TOP 100 * FROM [{{ schema }}].[{{ name }}]"
//! tooltip_templates:
//!   table: "{{ schema }}.{{ name }}"
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tsql_insight_catalog::ConnectionContext;
use tsql_insight_ir::{Dialect, ObjectKind};

use crate::actions::ActionDefinition;
use crate::template::JinjaTemplates;

/// Default cap on completion items per request
pub const DEFAULT_MAX_ITEMS: usize = 200;

/// Connection the documents of this engine are bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Stable connection identifier, used as the catalog cache key
    pub connection_id: String,

    /// Database used when a name does not specify one
    pub default_database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_id: "default".to_string(),
            default_database: "master".to_string(),
        }
    }
}

/// Completion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Maximum number of items returned per request
    pub max_items: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dialect of the connected server
    pub dialect: Dialect,

    /// Connection identity and default database
    pub connection: ConnectionConfig,

    /// Completion settings
    pub completion: CompletionConfig,

    /// Data-driven link actions
    pub actions: Vec<ActionDefinition>,

    /// Tooltip template overrides, keyed by object kind
    /// (`table`, `view`, `procedure`, `function`)
    pub tooltip_templates: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Create a configuration for a connection
    pub fn new(connection_id: impl Into<String>, default_database: impl Into<String>) -> Self {
        Self {
            connection: ConnectionConfig {
                connection_id: connection_id.into(),
                default_database: default_database.into(),
            },
            ..Default::default()
        }
    }

    /// Builder method: set the dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Builder method: add a link action
    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        self.actions.push(action);
        self
    }

    /// Builder method: override the tooltip template of one object kind
    pub fn with_tooltip_template(mut self, kind: ObjectKind, template: impl Into<String>) -> Self {
        self.tooltip_templates
            .insert(kind.as_str().to_string(), template.into());
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        // Enum variants are written as single-key maps, as in JSON
        let config: Self = serde_yaml::with::singleton_map_recursive::deserialize(
            serde_yaml::Deserializer::from_str(yaml),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - Connection id and default database are not empty
    /// - `completion.max_items` is positive
    /// - Action ids are unique
    /// - Tooltip template keys name an object kind
    /// - Action queries and tooltip templates compile
    pub fn validate(&self) -> ConfigResult<()> {
        if self.connection.connection_id.trim().is_empty() {
            return Err(ConfigError::MissingConnectionField {
                field: "connection_id",
            });
        }
        if self.connection.default_database.trim().is_empty() {
            return Err(ConfigError::MissingConnectionField {
                field: "default_database",
            });
        }

        if self.completion.max_items == 0 {
            return Err(ConfigError::InvalidCompletion {
                reason: "max_items must be > 0".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for action in &self.actions {
            if !ids.insert(action.id.as_str()) {
                return Err(ConfigError::DuplicateAction(action.id.clone()));
            }
        }

        for action in &self.actions {
            check_template(&action.id, &action.query)?;
        }

        for (key, template) in &self.tooltip_templates {
            if object_kind(key).is_none() {
                return Err(ConfigError::UnknownTemplateKind(key.clone()));
            }
            check_template(key, template)?;
        }

        Ok(())
    }

    /// Connection context handed to catalog providers
    pub fn connection_context(&self) -> ConnectionContext {
        ConnectionContext::new(
            self.connection.connection_id.clone(),
            self.connection.default_database.clone(),
        )
        .with_dialect(self.dialect)
    }
}

fn check_template(name: &str, source: &str) -> ConfigResult<()> {
    JinjaTemplates::check(name, source).map_err(|err| ConfigError::InvalidTemplate {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

/// Object kind named by a configuration key
pub(crate) fn object_kind(key: &str) -> Option<ObjectKind> {
    [
        ObjectKind::Table,
        ObjectKind::View,
        ObjectKind::Procedure,
        ObjectKind::Function,
    ]
    .into_iter()
    .find(|kind| kind.as_str().eq_ignore_ascii_case(key))
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON / YAML for this schema
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A required connection setting is empty
    #[error("Connection setting '{field}' must not be empty")]
    MissingConnectionField { field: &'static str },

    /// Invalid completion settings
    #[error("Invalid completion configuration: {reason}")]
    InvalidCompletion { reason: String },

    /// Two actions share an id
    #[error("Duplicate action id '{0}'")]
    DuplicateAction(String),

    /// Tooltip template keyed by something other than an object kind
    #[error("Unknown tooltip template kind '{0}'")]
    UnknownTemplateKind(String),

    /// An action query or tooltip template that does not compile
    #[error("Invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionPredicate;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion.max_items, DEFAULT_MAX_ITEMS);
        assert_eq!(config.dialect, Dialect::SqlServer);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"dialect": "azure_sql", "connection": {"default_database": "Sales"}}"#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::AzureSql);
        assert_eq!(config.connection.default_database, "Sales");
        assert_eq!(config.connection.connection_id, "default");
        assert!(config.actions.is_empty());
    }

    #[test]
    fn test_empty_database_rejected() {
        let mut config = EngineConfig::new("local", "Sales");
        config.connection.default_database = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingConnectionField {
                field: "default_database"
            })
        );
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let err = EngineConfig::from_json_str(r#"{"completion": {"max_items": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCompletion { .. }));
    }

    #[test]
    fn test_unknown_template_kind_rejected() {
        let err = EngineConfig::from_yaml_str("tooltip_templates:\n  trigger: \"{{name}}\"\n")
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownTemplateKind("trigger".to_string()));
    }

    #[test]
    fn test_malformed_templates_rejected() {
        let config = EngineConfig::new("local", "Sales")
            .with_tooltip_template(ObjectKind::Table, "{% for c in columns %}{{ c.name }}");
        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidTemplate { name, .. } if name == "table"),
            "{:?}",
            err
        );
        assert!(err.to_string().starts_with("Invalid template 'table'"));

        let config = EngineConfig::new("local", "Sales").with_action(ActionDefinition::new(
            "select_top",
            "Select top 100",
            "SELECT TOP 100 * FROM [{{ schema }}].[{{ name ]",
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemplate { name, .. }) if name == "select_top"
        ));

        let config = EngineConfig::new("local", "Sales")
            .with_tooltip_template(ObjectKind::View, "{% if comment %}{{ comment }}{% endif %}");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_predicates_use_map_form() {
        let yaml = r#"
actions:
  - id: select_top
    title: Select top 100
    predicate:
      all:
        - not_temp
        - schema_equals: sales
    query: "SELECT TOP 100 * FROM [{{ schema }}].[{{ name }}]"
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.actions[0].predicate,
            ActionPredicate::All(vec![
                ActionPredicate::NotTemp,
                ActionPredicate::SchemaEquals("sales".to_string()),
            ])
        );
    }

    #[test]
    fn test_malformed_input_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse configuration"));
    }

    #[test]
    fn test_connection_context_carries_dialect() {
        let context = EngineConfig::new("local", "Sales")
            .with_dialect(Dialect::AzureSynapse)
            .connection_context();
        assert_eq!(context.connection_id, "local");
        assert_eq!(context.default_database, "Sales");
        assert_eq!(context.dialect, Dialect::AzureSynapse);
    }

    #[test]
    fn test_object_kind_keys() {
        assert_eq!(object_kind("VIEW"), Some(ObjectKind::View));
        assert_eq!(object_kind("trigger"), None);
    }
}
