// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Link Actions
//!
//! Clickable actions offered on a table or routine reference ("select top
//! 100", "script as EXEC", ...) are data, not code. An [`ActionConfig`]
//! decides which definitions apply to an object; [`ConfiguredActions`]
//! evaluates the definitions loaded from [`crate::EngineConfig`].
//!
//! ## Predicates
//!
//! Each definition carries a small rule tree evaluated against the object
//! name:
//!
//! ```yaml
//! predicate:
//!   all:
//!     - not_temp
//!     - schema_equals: dbo
//!     - any:
//!         - name_prefix: Order
//!         - name_prefix: Customer
//! ```

use serde::{Deserialize, Serialize};
use tsql_insight_catalog::DEFAULT_SCHEMA;
use tsql_insight_ir::{Dialect, ObjectKind, ObjectName};

/// Rule deciding whether an action applies to an object name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPredicate {
    /// Matches everything
    #[default]
    Always,
    /// Schema equals (case-insensitive); a missing schema counts as `dbo`
    SchemaEquals(String),
    /// Object name starts with the prefix (case-insensitive)
    NamePrefix(String),
    /// Not a `#temp` table or `@variable`
    NotTemp,
    /// Every nested predicate matches
    All(Vec<ActionPredicate>),
    /// At least one nested predicate matches
    Any(Vec<ActionPredicate>),
}

impl ActionPredicate {
    pub fn matches(&self, name: &ObjectName) -> bool {
        match self {
            ActionPredicate::Always => true,
            ActionPredicate::SchemaEquals(schema) => name
                .schema
                .as_deref()
                .unwrap_or(DEFAULT_SCHEMA)
                .eq_ignore_ascii_case(schema),
            ActionPredicate::NamePrefix(prefix) => name
                .name
                .to_lowercase()
                .starts_with(&prefix.to_lowercase()),
            ActionPredicate::NotTemp => !name.is_temp() && !name.is_table_variable(),
            ActionPredicate::All(predicates) => predicates.iter().all(|p| p.matches(name)),
            ActionPredicate::Any(predicates) => predicates.iter().any(|p| p.matches(name)),
        }
    }
}

/// One configured action
///
/// `query` is a template rendered against the object's name model
/// (`database`, `schema`, `name`, `kind`, `dialect`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: String,
    pub title: String,
    /// Dialects the action applies to; empty means all
    #[serde(default)]
    pub dialects: Vec<Dialect>,
    /// Object kinds the action applies to; empty means all
    #[serde(default)]
    pub object_kinds: Vec<ObjectKind>,
    #[serde(default)]
    pub predicate: ActionPredicate,
    pub query: String,
}

impl ActionDefinition {
    /// Create an action applying to every dialect and object kind
    pub fn new(id: impl Into<String>, title: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            dialects: Vec::new(),
            object_kinds: Vec::new(),
            predicate: ActionPredicate::Always,
            query: query.into(),
        }
    }

    /// Builder method: restrict to dialects
    pub fn for_dialects(mut self, dialects: &[Dialect]) -> Self {
        self.dialects = dialects.to_vec();
        self
    }

    /// Builder method: restrict to object kinds
    pub fn for_kinds(mut self, kinds: &[ObjectKind]) -> Self {
        self.object_kinds = kinds.to_vec();
        self
    }

    /// Builder method: set the predicate
    pub fn with_predicate(mut self, predicate: ActionPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Whether the action applies to an object
    pub fn applies_to(&self, dialect: Dialect, kind: ObjectKind, name: &ObjectName) -> bool {
        (self.dialects.is_empty() || self.dialects.contains(&dialect))
            && (self.object_kinds.is_empty() || self.object_kinds.contains(&kind))
            && self.predicate.matches(name)
    }
}

/// Source of link actions
pub trait ActionConfig: Send + Sync {
    /// Actions applicable to an object, in configuration order
    fn applicable_actions(
        &self,
        dialect: Dialect,
        kind: ObjectKind,
        name: &ObjectName,
    ) -> Vec<ActionDefinition>;
}

/// [`ActionConfig`] backed by a list of definitions
#[derive(Debug, Clone, Default)]
pub struct ConfiguredActions {
    definitions: Vec<ActionDefinition>,
}

impl ConfiguredActions {
    pub fn new(definitions: Vec<ActionDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[ActionDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ActionConfig for ConfiguredActions {
    fn applicable_actions(
        &self,
        dialect: Dialect,
        kind: ObjectKind,
        name: &ObjectName,
    ) -> Vec<ActionDefinition> {
        self.definitions
            .iter()
            .filter(|action| action.applies_to(dialect, kind, name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> ObjectName {
        ObjectName::new("Orders").with_schema("dbo")
    }

    #[test]
    fn test_predicates() {
        let name = orders();
        assert!(ActionPredicate::Always.matches(&name));
        assert!(ActionPredicate::SchemaEquals("DBO".to_string()).matches(&name));
        assert!(ActionPredicate::SchemaEquals("dbo".to_string()).matches(&ObjectName::new("x")));
        assert!(!ActionPredicate::SchemaEquals("archive".to_string()).matches(&name));
        assert!(ActionPredicate::NamePrefix("ord".to_string()).matches(&name));
        assert!(ActionPredicate::NotTemp.matches(&name));
        assert!(!ActionPredicate::NotTemp.matches(&ObjectName::new("#recent")));
        assert!(!ActionPredicate::NotTemp.matches(&ObjectName::new("@ids")));
    }

    #[test]
    fn test_nested_predicates() {
        let predicate = ActionPredicate::All(vec![
            ActionPredicate::NotTemp,
            ActionPredicate::Any(vec![
                ActionPredicate::NamePrefix("Cust".to_string()),
                ActionPredicate::NamePrefix("Ord".to_string()),
            ]),
        ]);
        assert!(predicate.matches(&orders()));
        assert!(!predicate.matches(&ObjectName::new("Table1")));
        assert!(ActionPredicate::All(vec![]).matches(&orders()));
        assert!(!ActionPredicate::Any(vec![]).matches(&orders()));
    }

    #[test]
    fn test_filters_by_dialect_and_kind() {
        let actions = ConfiguredActions::new(vec![
            ActionDefinition::new("select", "Select rows", "SELECT * FROM {{name}}")
                .for_kinds(&[ObjectKind::Table, ObjectKind::View]),
            ActionDefinition::new("exec", "Execute", "EXEC {{name}}")
                .for_kinds(&[ObjectKind::Procedure]),
            ActionDefinition::new("azure", "Azure only", "--")
                .for_dialects(&[Dialect::AzureSql]),
        ]);

        let ids = |dialect, kind| -> Vec<String> {
            actions
                .applicable_actions(dialect, kind, &orders())
                .into_iter()
                .map(|a| a.id)
                .collect()
        };
        assert_eq!(ids(Dialect::SqlServer, ObjectKind::Table), vec!["select"]);
        assert_eq!(ids(Dialect::AzureSql, ObjectKind::Table), vec!["select", "azure"]);
        assert_eq!(ids(Dialect::SqlServer, ObjectKind::Procedure), vec!["exec"]);
        assert!(ids(Dialect::SqlServer, ObjectKind::Function).is_empty());
    }

    #[test]
    fn test_definitions_deserialize_from_json() {
        let json = r#"[{
            "id": "archive",
            "title": "Open archive",
            "object_kinds": ["table"],
            "predicate": {"all": ["not_temp", {"schema_equals": "archive"}]},
            "query": "SELECT * FROM {{schema}}.{{name}}"
        }]"#;
        let definitions: Vec<ActionDefinition> = serde_json::from_str(json).unwrap();
        assert_eq!(definitions[0].dialects, Vec::<Dialect>::new());
        assert_eq!(
            definitions[0].predicate,
            ActionPredicate::All(vec![
                ActionPredicate::NotTemp,
                ActionPredicate::SchemaEquals("archive".to_string()),
            ])
        );
        let archived = ObjectName::new("Orders").with_schema("archive");
        assert!(definitions[0].applies_to(Dialect::SqlServer, ObjectKind::Table, &archived));
        assert!(!definitions[0].applies_to(Dialect::SqlServer, ObjectKind::Table, &orders()));
    }
}
