// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tooltip Provider
//!
//! Resolves hover text for the table or routine name under the caret.
//!
//! ## Flow
//!
//! 1. Find the innermost node containing the offset and climb to the
//!    enclosing table or routine reference
//! 2. Fill in the default database and fetch the catalog for it
//! 3. Look the object up; a table can turn out to be a view, a routine a
//!    function
//! 4. Build a JSON model (columns, indices, foreign keys, constraints or
//!    parameters) and render the template for the object kind
//!
//! ## Example
//!
//! ```sql
//! SELECT * FROM dbo.Or|ders o
//! ```
//!
//! Hovering inside `Orders` renders the table template for `Sales.dbo.Orders`
//! over the span of `dbo.Orders`. Unknown objects, linked-server names,
//! unavailable catalogs and cross-database names on dialects without them
//! produce no tooltip.

use std::ops::Range;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use tsql_insight_catalog::{CatalogProvider, ConnectionContext, DEFAULT_SCHEMA, DatabaseCatalog};
use tsql_insight_context::NodeKindClassifier;
use tsql_insight_ir::{DialectExtensions, ObjectKind, RoutineMetadata, TableMetadata};
use tsql_insight_semantic::ParseSession;

use crate::reference::reference_at;
use crate::template::{TemplateService, TooltipTemplates};

/// Rendered hover text over a document span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolTip {
    pub span: Range<usize>,
    pub text: String,
}

/// Tooltip resolver
pub struct TooltipResolver<'a> {
    classifier: &'a NodeKindClassifier,
    connection: &'a ConnectionContext,
    templates: &'a TooltipTemplates,
}

impl<'a> TooltipResolver<'a> {
    pub fn new(
        classifier: &'a NodeKindClassifier,
        connection: &'a ConnectionContext,
        templates: &'a TooltipTemplates,
    ) -> Self {
        Self {
            classifier,
            connection,
            templates,
        }
    }

    /// Resolve the tooltip at `offset`
    ///
    /// # Returns
    ///
    /// `None` when there is no reference under the caret, the catalog is
    /// unavailable, or the object is not in the catalog
    pub fn resolve_tooltip(
        &self,
        session: &ParseSession,
        offset: usize,
        catalogs: &dyn CatalogProvider,
        templates: &dyn TemplateService,
    ) -> Option<ToolTip> {
        let reference = reference_at(self.classifier, session.tree(), offset)?;
        if reference.name.is_server_qualified() {
            debug!(name = %reference.name.object, "No tooltip for linked-server names");
            return None;
        }

        let name = reference
            .name
            .object
            .or_database(&self.connection.default_database);
        let database = name.database.clone().unwrap_or_default();
        if !database.eq_ignore_ascii_case(&self.connection.default_database)
            && !self
                .connection
                .dialect
                .supports(DialectExtensions::CrossDatabaseNames)
        {
            debug!(
                database = %database,
                dialect = self.connection.dialect.as_str(),
                "Cross-database name not resolvable on this dialect"
            );
            return None;
        }
        let lookup = catalogs.get_catalog(self.connection, &database);
        let Some(catalog) = lookup.available() else {
            debug!(database = %database, "Catalog unavailable, no tooltip");
            return None;
        };

        let (kind, model) = match reference.kind {
            ObjectKind::Table | ObjectKind::View => {
                let table = catalog.find_table(&name)?;
                let kind = if table.is_view() {
                    ObjectKind::View
                } else {
                    ObjectKind::Table
                };
                (kind, table_model(kind, catalog, table))
            }
            ObjectKind::Procedure | ObjectKind::Function => {
                let routine = catalog.find_routine(&name)?;
                let kind = if routine.is_function() {
                    ObjectKind::Function
                } else {
                    ObjectKind::Procedure
                };
                (kind, routine_model(kind, &catalog.name, routine))
            }
        };

        let text = templates.render(kind.as_str(), self.templates.template_for(kind), &model);
        if text.trim().is_empty() {
            debug!(object = %name, "Tooltip rendered empty");
            return None;
        }
        Some(ToolTip {
            span: reference.span,
            text,
        })
    }
}

/// Template model of a table or view
///
/// Indices, foreign keys and constraints are filtered to the table.
pub fn table_model(kind: ObjectKind, catalog: &DatabaseCatalog, table: &TableMetadata) -> Value {
    let columns: Vec<Value> = table
        .columns
        .iter()
        .map(|c| {
            json!({
                "name": c.name,
                "data_type": c.data_type.to_string(),
                "nullable": c.nullable,
                "primary_key": c.is_primary_key,
                "comment": c.comment,
            })
        })
        .collect();
    let indices: Vec<Value> = catalog
        .indices_for(table)
        .into_iter()
        .map(|i| {
            json!({
                "name": i.name,
                "columns": i.columns.join(", "),
                "unique": i.is_unique,
                "clustered": i.is_clustered,
            })
        })
        .collect();
    let foreign_keys: Vec<Value> = catalog
        .foreign_keys_for(table)
        .into_iter()
        .map(|fk| {
            json!({
                "name": fk.name,
                "columns": fk.columns.join(", "),
                "referenced_table": format!("{}.{}", fk.referenced_schema, fk.referenced_table),
                "referenced_columns": fk.referenced_columns.join(", "),
            })
        })
        .collect();
    let constraints: Vec<Value> = catalog
        .constraints_for(table)
        .into_iter()
        .map(|c| {
            json!({
                "name": c.name,
                "constraint_type": c.constraint_type.to_string(),
                "definition": c.definition,
            })
        })
        .collect();

    json!({
        "kind": kind.as_str(),
        "database": catalog.name,
        "schema": table.schema,
        "name": table.name,
        "comment": table.comment,
        "columns": columns,
        "indices": indices,
        "foreign_keys": foreign_keys,
        "constraints": constraints,
    })
}

/// Template model of a procedure or function
pub fn routine_model(kind: ObjectKind, database: &str, routine: &RoutineMetadata) -> Value {
    let parameters: Vec<Value> = routine
        .parameters
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "data_type": p.data_type.to_string(),
                "output": p.is_output,
            })
        })
        .collect();
    let result_columns: Vec<Value> = routine
        .result_columns
        .iter()
        .map(|c| json!({"name": c.name, "data_type": c.data_type.to_string()}))
        .collect();
    let schema = if routine.schema.is_empty() {
        DEFAULT_SCHEMA
    } else {
        routine.schema.as_str()
    };

    json!({
        "kind": kind.as_str(),
        "database": database,
        "schema": schema,
        "name": routine.name,
        "signature": routine.signature(),
        "comment": routine.comment,
        "parameters": parameters,
        "result_columns": result_columns,
    })
}
