// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Database catalog snapshot
//!
//! A [`DatabaseCatalog`] is the complete metadata of one database: table
//! sources, routines, indices, foreign keys and constraints. Snapshots are
//! immutable once published and shared behind an `Arc`.

use serde::{Deserialize, Serialize};
use tsql_insight_ir::{
    ConstraintMetadata, ForeignKeyMetadata, IndexMetadata, ObjectName, RoutineMetadata,
    TableMetadata,
};

/// Schema assumed when a name does not specify one
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Metadata for one database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCatalog {
    /// Database name
    pub name: String,
    /// Tables and views
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
    /// Stored procedures and user-defined functions
    #[serde(default)]
    pub routines: Vec<RoutineMetadata>,
    /// Indices of all tables
    #[serde(default)]
    pub indices: Vec<IndexMetadata>,
    /// Foreign keys of all tables
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyMetadata>,
    /// Other constraints of all tables
    #[serde(default)]
    pub constraints: Vec<ConstraintMetadata>,
}

/// Pick the best candidate for a possibly schema-less name
///
/// An explicit schema must match. Without one, `dbo` wins over other schemas.
fn pick<'a, T>(
    items: &'a [T],
    name: &ObjectName,
    parts: impl Fn(&T) -> (&str, &str),
) -> Option<&'a T> {
    let mut candidates = items
        .iter()
        .filter(|item| parts(item).1.eq_ignore_ascii_case(&name.name));
    match &name.schema {
        Some(schema) => candidates.find(|item| parts(item).0.eq_ignore_ascii_case(schema)),
        None => {
            let all: Vec<&T> = candidates.collect();
            all.iter()
                .find(|item| parts(item).0.eq_ignore_ascii_case(DEFAULT_SCHEMA))
                .or_else(|| all.first())
                .copied()
        }
    }
}

impl DatabaseCatalog {
    /// Create an empty catalog for a database
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a table or view
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    /// Builder method: add a routine
    pub fn with_routine(mut self, routine: RoutineMetadata) -> Self {
        self.routines.push(routine);
        self
    }

    /// Builder method: add an index
    pub fn with_index(mut self, index: IndexMetadata) -> Self {
        self.indices.push(index);
        self
    }

    /// Builder method: add a foreign key
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyMetadata) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Builder method: add a constraint
    pub fn with_constraint(mut self, constraint: ConstraintMetadata) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Find a table or view by name
    ///
    /// The database part of `name` is ignored; callers pick the catalog by
    /// database first.
    pub fn find_table(&self, name: &ObjectName) -> Option<&TableMetadata> {
        pick(&self.tables, name, |t| (t.schema.as_str(), t.name.as_str()))
    }

    /// Find a procedure or function by name
    pub fn find_routine(&self, name: &ObjectName) -> Option<&RoutineMetadata> {
        pick(&self.routines, name, |r| (r.schema.as_str(), r.name.as_str()))
    }

    /// Indices defined on a table
    pub fn indices_for(&self, table: &TableMetadata) -> Vec<&IndexMetadata> {
        self.indices
            .iter()
            .filter(|i| {
                i.schema.eq_ignore_ascii_case(&table.schema)
                    && i.table.eq_ignore_ascii_case(&table.name)
            })
            .collect()
    }

    /// Foreign keys declared on a table
    pub fn foreign_keys_for(&self, table: &TableMetadata) -> Vec<&ForeignKeyMetadata> {
        self.foreign_keys
            .iter()
            .filter(|fk| {
                fk.schema.eq_ignore_ascii_case(&table.schema)
                    && fk.table.eq_ignore_ascii_case(&table.name)
            })
            .collect()
    }

    /// Constraints declared on a table
    pub fn constraints_for(&self, table: &TableMetadata) -> Vec<&ConstraintMetadata> {
        self.constraints
            .iter()
            .filter(|c| {
                c.schema.eq_ignore_ascii_case(&table.schema)
                    && c.table.eq_ignore_ascii_case(&table.name)
            })
            .collect()
    }
}
