// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Object names
//!
//! Multi-part T-SQL object names (`[server.][database.][schema.]name`).
//!
//! Identifiers are compared case-insensitively, which matches the default
//! collation of SQL Server catalogs. Missing parts are resolved contextually by
//! the caller (usually the connection's current database).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A possibly-qualified object name
///
/// # Examples
///
/// ```
/// use tsql_insight_ir::ObjectName;
///
/// let a = ObjectName::new("Orders").with_schema("dbo");
/// let b = ObjectName::new("ORDERS").with_schema("DBO");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "dbo.Orders");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectName {
    /// Database part (`None` when the name did not specify one)
    pub database: Option<String>,
    /// Schema part
    pub schema: Option<String>,
    /// Object part
    pub name: String,
}

impl ObjectName {
    /// Create an unqualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Builder method: set the schema part
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method: set the database part
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Whether the name denotes a session temp table (`#t` or `##t`)
    pub fn is_temp(&self) -> bool {
        self.name.starts_with('#')
    }

    /// Whether the name denotes a table variable (`@t`)
    pub fn is_table_variable(&self) -> bool {
        self.name.starts_with('@')
    }

    /// Fill in the database part when it was not written
    pub fn or_database(mut self, database: &str) -> Self {
        if self.database.is_none() && !database.is_empty() {
            self.database = Some(database.to_string());
        }
        self
    }

    /// Drop database and schema, keeping only the object part
    pub fn unqualified(self) -> Self {
        Self::new(self.name)
    }

    /// Lower-cased lookup key for the object part
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

fn eq_part(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && eq_part(&self.schema, &other.schema)
            && eq_part(&self.database, &other.database)
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.database.as_ref().map(|d| d.to_lowercase()).hash(state);
        self.schema.as_ref().map(|s| s.to_lowercase()).hash(state);
        self.name.to_lowercase().hash(state);
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.database, &self.schema) {
            (Some(db), Some(schema)) => write!(f, "{}.{}.{}", db, schema, self.name),
            (Some(db), None) => write!(f, "{}..{}", db, self.name),
            (None, Some(schema)) => write!(f, "{}.{}", schema, self.name),
            (None, None) => f.write_str(&self.name),
        }
    }
}

/// An object name together with its (optional) linked-server part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Linked server part of a four-part name
    pub server: Option<String>,
    /// The remaining parts
    pub object: ObjectName,
}

impl QualifiedName {
    /// Build a name from dotted parts, last part first in priority
    ///
    /// Empty parts (as in `db..table`) are `None`. Returns `None` when the
    /// object part itself is missing or there are more than four parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsql_insight_ir::QualifiedName;
    ///
    /// let parts = vec![Some("Sales".to_string()), None, Some("Orders".to_string())];
    /// let name = QualifiedName::from_parts(&parts).unwrap();
    /// assert_eq!(name.object.database.as_deref(), Some("Sales"));
    /// assert_eq!(name.object.schema, None);
    /// assert_eq!(name.object.name, "Orders");
    /// ```
    pub fn from_parts(parts: &[Option<String>]) -> Option<Self> {
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }
        let mut rev = parts.iter().rev();
        let name = rev.next()?.clone()?;
        let schema = rev.next().cloned().flatten();
        let database = rev.next().cloned().flatten();
        let server = rev.next().cloned().flatten();
        Some(Self {
            server,
            object: ObjectName {
                database,
                schema,
                name,
            },
        })
    }

    /// Whether the name reaches through a linked server
    pub fn is_server_qualified(&self) -> bool {
        self.server.is_some()
    }
}

/// Kind of catalog object a reference resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    View,
    Procedure,
    Function,
}

impl ObjectKind {
    /// Stable lower-case name, used for template and action lookups
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_insensitive_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(ObjectName::new("Orders").with_schema("dbo"));
        assert!(set.contains(&ObjectName::new("orders").with_schema("DBO")));
        assert!(!set.contains(&ObjectName::new("orders")));
    }

    #[test]
    fn test_display_with_missing_schema() {
        let name = ObjectName::new("t").with_database("db");
        assert_eq!(name.to_string(), "db..t");
    }

    #[test]
    fn test_temp_and_variable_detection() {
        assert!(ObjectName::new("#t").is_temp());
        assert!(ObjectName::new("##global").is_temp());
        assert!(ObjectName::new("@t").is_table_variable());
        assert!(!ObjectName::new("t").is_temp());
    }

    #[test]
    fn test_or_database_keeps_explicit_part() {
        let name = ObjectName::new("t").with_database("other").or_database("main");
        assert_eq!(name.database.as_deref(), Some("other"));
        let name = ObjectName::new("t").or_database("main");
        assert_eq!(name.database.as_deref(), Some("main"));
    }

    #[test]
    fn test_four_part_name() {
        let parts: Vec<Option<String>> = ["srv", "db", "dbo", "t"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let name = QualifiedName::from_parts(&parts).unwrap();
        assert!(name.is_server_qualified());
        assert_eq!(name.object.to_string(), "db.dbo.t");
    }

    #[test]
    fn test_missing_object_part() {
        let parts = vec![Some("dbo".to_string()), None];
        assert!(QualifiedName::from_parts(&parts).is_none());
    }
}
