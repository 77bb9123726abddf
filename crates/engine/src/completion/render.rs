// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion rendering
//!
//! Builds [`CompletionItem`]s from scope sources, catalog metadata and the
//! temp-object registry.

use serde::Serialize;
use tsql_insight_catalog::DEFAULT_SCHEMA;
use tsql_insight_ir::{RoutineMetadata, TableMetadata};

/// What a completion item inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionItemKind {
    Column,
    Table,
    View,
    TempTable,
    TableVariable,
    Procedure,
    Function,
}

impl CompletionItemKind {
    /// Sort weight; lower sorts first
    ///
    /// Columns come before session objects, which come before catalog
    /// tables, which come before routines.
    pub fn sort_weight(self) -> u32 {
        match self {
            CompletionItemKind::Column => 10,
            CompletionItemKind::TempTable | CompletionItemKind::TableVariable => 20,
            CompletionItemKind::Table | CompletionItemKind::View => 30,
            CompletionItemKind::Procedure | CompletionItemKind::Function => 40,
        }
    }
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    /// Name parts the editor filters on (`["o", "Total"]`)
    pub match_parts: Vec<String>,
    /// Text inserted on accept (`o.Total`)
    pub replacement_text: String,
    pub kind: CompletionItemKind,
    pub sort_weight: u32,
    /// Short description shown next to the label
    pub detail: Option<String>,
}

impl CompletionItem {
    /// Create an item whose weight follows its kind
    pub fn new(match_parts: Vec<String>, kind: CompletionItemKind) -> Self {
        let replacement_text = match_parts.join(".");
        Self {
            match_parts,
            replacement_text,
            kind,
            sort_weight: kind.sort_weight(),
            detail: None,
        }
    }

    /// Builder method: set the detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Ordering key: weight, then case-insensitive replacement text
    pub fn sort_key(&self) -> (u32, String) {
        (self.sort_weight, self.replacement_text.to_lowercase())
    }
}

/// Completion answer
///
/// `partial` is set when some metadata was unavailable, telling the editor
/// to ask again later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub items: Vec<CompletionItem>,
    pub partial: bool,
}

impl CompletionResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Replacement texts in order
    pub fn replacements(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.replacement_text.as_str())
            .collect()
    }
}

/// Completion renderer
///
/// Converts sources and metadata to [`CompletionItem`]s.
pub struct CompletionRenderer;

impl CompletionRenderer {
    /// Column item, qualified with the alias when the source has one
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let item = CompletionRenderer::column_item("o", "Total", Some("decimal(10, 2)"));
    /// assert_eq!(item.replacement_text, "o.Total");
    /// ```
    pub fn column_item(qualifier: &str, column: &str, data_type: Option<String>) -> CompletionItem {
        let parts = if qualifier.is_empty() {
            vec![column.to_string()]
        } else {
            vec![qualifier.to_string(), column.to_string()]
        };
        let item = CompletionItem::new(parts, CompletionItemKind::Column);
        match data_type {
            Some(data_type) => item.with_detail(data_type),
            None => item,
        }
    }

    /// Catalog table or view item, inserted as `schema.name`
    pub fn table_item(table: &TableMetadata) -> CompletionItem {
        let (kind, label) = if table.is_view() {
            (CompletionItemKind::View, "VIEW")
        } else {
            (CompletionItemKind::Table, "TABLE")
        };
        CompletionItem::new(vec![schema_or_default(&table.schema), table.name.clone()], kind)
            .with_detail(format!("{}.{} [{}]", schema_or_default(&table.schema), table.name, label))
    }

    /// Temp table or table variable item
    pub fn temp_item(name: &str, columns: usize) -> CompletionItem {
        let kind = if name.starts_with('@') {
            CompletionItemKind::TableVariable
        } else {
            CompletionItemKind::TempTable
        };
        CompletionItem::new(vec![name.to_string()], kind).with_detail(format!("{} columns", columns))
    }

    /// Procedure or function item, inserted as `schema.name`
    pub fn routine_item(routine: &RoutineMetadata) -> CompletionItem {
        let kind = if routine.is_function() {
            CompletionItemKind::Function
        } else {
            CompletionItemKind::Procedure
        };
        CompletionItem::new(vec![schema_or_default(&routine.schema), routine.name.clone()], kind)
            .with_detail(routine.signature())
    }
}

fn schema_or_default(schema: &str) -> String {
    if schema.is_empty() {
        DEFAULT_SCHEMA.to_string()
    } else {
        schema.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsql_insight_ir::{DataType, RoutineParameter, RoutineType, TableType};

    #[test]
    fn test_column_items() {
        let item = CompletionRenderer::column_item("o", "Total", Some("int".to_string()));
        assert_eq!(item.replacement_text, "o.Total");
        assert_eq!(item.match_parts, vec!["o", "Total"]);
        assert_eq!(item.detail.as_deref(), Some("int"));

        let item = CompletionRenderer::column_item("", "Total", None);
        assert_eq!(item.replacement_text, "Total");
        assert_eq!(item.sort_weight, 10);
    }

    #[test]
    fn test_table_items() {
        let table = TableMetadata::new("Orders", "dbo");
        let item = CompletionRenderer::table_item(&table);
        assert_eq!(item.replacement_text, "dbo.Orders");
        assert_eq!(item.kind, CompletionItemKind::Table);
        assert_eq!(item.detail.as_deref(), Some("dbo.Orders [TABLE]"));

        let view = TableMetadata::new("ActiveOrders", "").with_type(TableType::View);
        let item = CompletionRenderer::table_item(&view);
        assert_eq!(item.replacement_text, "dbo.ActiveOrders");
        assert_eq!(item.kind, CompletionItemKind::View);
    }

    #[test]
    fn test_temp_and_routine_items() {
        assert_eq!(
            CompletionRenderer::temp_item("@ids", 1).kind,
            CompletionItemKind::TableVariable
        );
        assert_eq!(
            CompletionRenderer::temp_item("#recent", 2).kind,
            CompletionItemKind::TempTable
        );

        let routine = RoutineMetadata::new("GetOrders", "dbo")
            .with_type(RoutineType::Procedure)
            .with_parameters(vec![RoutineParameter::new("@CustomerId", DataType::Int)]);
        let item = CompletionRenderer::routine_item(&routine);
        assert_eq!(item.replacement_text, "dbo.GetOrders");
        assert_eq!(item.kind, CompletionItemKind::Procedure);
        assert_eq!(item.detail.as_deref(), Some("dbo.GetOrders(@CustomerId int)"));
    }

    #[test]
    fn test_kind_weights_order_groups() {
        let mut items = [
            CompletionRenderer::temp_item("#t", 0),
            CompletionItem::new(vec!["dbo".into(), "b".into()], CompletionItemKind::Procedure),
            CompletionRenderer::column_item("", "z", None),
            CompletionItem::new(vec!["dbo".into(), "A".into()], CompletionItemKind::Table),
        ];
        items.sort_by_key(CompletionItem::sort_key);
        let order: Vec<_> = items.iter().map(|i| i.replacement_text.as_str()).collect();
        assert_eq!(order, vec!["z", "#t", "dbo.A", "dbo.b"]);
    }
}
