// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Tooltips and link actions on object names

use std::sync::Mutex;

use serde_json::Value;
use tsql_insight_catalog::{CatalogProvider, ConnectionContext};
use tsql_insight_context::NodeKindClassifier;
use tsql_insight_engine::{
    ActionDefinition, ActionPredicate, ConfiguredActions, JinjaTemplates, LinkAction,
    LinkResolver, TemplateService, ToolTip, TooltipResolver, TooltipTemplates,
};
use tsql_insight_ir::{Dialect, ObjectKind};
use tsql_insight_semantic::{ParseSession, Validator};
use tsql_insight_test_utils::{
    FixtureGrammar, STANDARD_DATABASE, UnavailableCatalog, init_tracing, standard_catalog,
};

fn session_with(sql: &str, catalogs: &dyn CatalogProvider) -> ParseSession {
    init_tracing();
    let classifier = NodeKindClassifier::tsql();
    let connection = ConnectionContext::new("test", STANDARD_DATABASE);
    let validator = Validator::new(&classifier, catalogs, &connection);
    ParseSession::build(sql, &FixtureGrammar::new(), &validator).expect("fixture grammar builds trees")
}

fn tooltip_with(
    sql: &str,
    offset: usize,
    catalogs: &dyn CatalogProvider,
    templates: &TooltipTemplates,
) -> Option<ToolTip> {
    let session = session_with(sql, catalogs);
    let classifier = NodeKindClassifier::tsql();
    let connection = ConnectionContext::new("test", STANDARD_DATABASE);
    TooltipResolver::new(&classifier, &connection, templates).resolve_tooltip(
        &session,
        offset,
        catalogs,
        &JinjaTemplates::new(),
    )
}

fn tooltip(sql: &str, offset: usize) -> Option<ToolTip> {
    tooltip_with(sql, offset, standard_catalog().as_ref(), &TooltipTemplates::default())
}

fn actions() -> ConfiguredActions {
    ConfiguredActions::new(vec![
        ActionDefinition::new(
            "select_top",
            "Select top 100",
            "SELECT TOP 100 * FROM [{{database}}].[{{schema}}].[{{name}}]",
        )
        .for_kinds(&[ObjectKind::Table, ObjectKind::View])
        .with_predicate(ActionPredicate::NotTemp),
        ActionDefinition::new("exec", "Execute", "EXEC {{schema}}.{{name}}")
            .for_kinds(&[ObjectKind::Procedure]),
        ActionDefinition::new("stats", "Show statistics", "-- {{dialect}} {{kind}} {{name}}")
            .for_dialects(&[Dialect::AzureSql]),
    ])
}

fn link_with(sql: &str, offset: usize, connection: &ConnectionContext) -> Option<LinkAction> {
    let catalogs = standard_catalog();
    let session = session_with(sql, catalogs.as_ref());
    let classifier = NodeKindClassifier::tsql();
    LinkResolver::new(&classifier, connection).resolve_link(
        &session,
        offset,
        &actions(),
        &JinjaTemplates::new(),
    )
}

fn link(sql: &str, offset: usize) -> Option<LinkAction> {
    link_with(sql, offset, &ConnectionContext::new("test", STANDARD_DATABASE))
}

// ===== Tooltips =====

#[test]
fn test_table_tooltip_lists_columns_and_related_objects() {
    let tip = tooltip("SELECT * FROM dbo.Orders o", 20).unwrap();
    assert_eq!(tip.span, 14..24);

    let text = &tip.text;
    assert!(text.starts_with("**table** `Sales.dbo.Orders`"), "{}", text);
    assert!(text.contains("Customer orders"));
    assert!(text.contains("| Id (PK) | int | no |"), "{}", text);
    assert!(text.contains("| Total | decimal(10, 2) | yes |"));
    assert!(text.contains("- PK_Orders (Id) unique clustered\n"));
    assert!(text.contains("- IX_Orders_CustomerId (CustomerId)\n"));
    assert!(text.contains("- FK_Orders_Customers: (CustomerId) -> dbo.Customers (Id)"));
    assert!(text.contains("- PK_Orders PRIMARY KEY\n"));
    assert!(text.contains("- DF_Orders_Status DEFAULT ('new')"));
}

#[test]
fn test_table_without_related_objects_omits_sections() {
    // No schema written: dbo wins
    let tip = tooltip("SELECT * FROM Customers", 16).unwrap();
    assert!(tip.text.starts_with("**table** `Sales.dbo.Customers`"));
    assert!(tip.text.contains("| Email | nvarchar(200) | yes |"));
    assert!(!tip.text.contains("**Indices**"));
    assert!(!tip.text.contains("**Foreign keys**"));
}

#[test]
fn test_catalog_refines_table_to_view() {
    let tip = tooltip("SELECT * FROM dbo.ActiveOrders", 20).unwrap();
    assert_eq!(tip.span, 14..30);
    assert!(tip.text.starts_with("**view** `Sales.dbo.ActiveOrders`"));
}

#[test]
fn test_other_database_is_looked_up() {
    let tip = tooltip("SELECT * FROM Hr.dbo.Employees", 25).unwrap();
    assert!(tip.text.starts_with("**table** `Hr.dbo.Employees`"));
}

#[test]
fn test_routine_tooltips() {
    let tip = tooltip("EXEC dbo.GetOrders 1", 10).unwrap();
    assert!(tip.text.starts_with("**procedure** `dbo.GetOrders(@CustomerId int)`"));
    assert!(tip.text.contains("Orders of one customer"));

    let tip = tooltip("SELECT * FROM dbo.OrdersByCustomer(1) f", 20).unwrap();
    assert!(tip.text.starts_with("**function** `dbo.OrdersByCustomer(@CustomerId int)`"));
    assert!(tip.text.contains("| OrderId | int |"));
}

#[test]
fn test_absent_tooltips() {
    // Unknown object
    assert!(tooltip("SELECT * FROM dbo.Nope", 20).is_none());
    // Linked server
    assert!(tooltip("SELECT * FROM srv.Sales.dbo.Orders", 30).is_none());
    // Temp table
    assert!(tooltip("CREATE TABLE #t (a int)\nSELECT * FROM #t", 39).is_none());
    // Column and keyword
    assert!(tooltip("SELECT o.Id FROM dbo.Orders o", 9).is_none());
    assert!(tooltip("SELECT o.Id FROM dbo.Orders o", 2).is_none());
    // Unavailable catalog
    let catalogs = UnavailableCatalog::new();
    assert!(
        tooltip_with("SELECT * FROM dbo.Orders o", 20, &catalogs, &TooltipTemplates::default())
            .is_none()
    );
}

#[test]
fn test_template_override() {
    let mut templates = TooltipTemplates::default();
    templates.set(ObjectKind::Table, "{{kind}}:{{schema}}.{{name}} ({{database}})");
    let tip = tooltip_with(
        "SELECT * FROM dbo.Orders o",
        20,
        standard_catalog().as_ref(),
        &templates,
    )
    .unwrap();
    assert_eq!(tip.text, "table:dbo.Orders (Sales)");
}

#[test]
fn test_template_that_fails_to_render_gives_no_tooltip() {
    let mut templates = TooltipTemplates::default();
    templates.set(ObjectKind::Table, "{% for c in columns %}{{ c.name }}");
    let tip = tooltip_with(
        "SELECT * FROM dbo.Orders o",
        20,
        standard_catalog().as_ref(),
        &templates,
    );
    assert!(tip.is_none());
}

#[test]
fn test_default_table_template_layout() {
    let tip = tooltip("SELECT * FROM dbo.Customers", 20).unwrap();
    let lines: Vec<&str> = tip.text.lines().collect();
    assert_eq!(lines[0], "**table** `Sales.dbo.Customers`");
    assert!(lines.contains(&"| Column | Type | Nullable |"));
    assert!(lines.contains(&"| Id (PK) | int | no |"));
    assert!(!tip.text.contains("{{"));
    assert!(!tip.text.contains("{%"));
}

#[derive(Default)]
struct RecordingTemplates {
    names: Mutex<Vec<String>>,
}

impl TemplateService for RecordingTemplates {
    fn render(&self, name: &str, _template: &str, model: &Value) -> String {
        self.names.lock().unwrap().push(name.to_string());
        model["name"].as_str().unwrap_or_default().to_string()
    }
}

#[test]
fn test_template_service_receives_kind_and_model() {
    let catalogs = standard_catalog();
    let session = session_with("SELECT * FROM dbo.ActiveOrders", catalogs.as_ref());
    let classifier = NodeKindClassifier::tsql();
    let connection = ConnectionContext::new("test", STANDARD_DATABASE);
    let templates = TooltipTemplates::default();
    let recorder = RecordingTemplates::default();

    let tip = TooltipResolver::new(&classifier, &connection, &templates)
        .resolve_tooltip(&session, 20, catalogs.as_ref(), &recorder)
        .unwrap();
    assert_eq!(tip.text, "ActiveOrders");
    assert_eq!(*recorder.names.lock().unwrap(), vec!["view".to_string()]);
}

// ===== Link actions =====

#[test]
fn test_table_link_binds_query() {
    let link = link("SELECT * FROM dbo.Orders o", 20).unwrap();
    assert_eq!(link.span, 14..24);
    assert_eq!(link.kind, ObjectKind::Table);
    assert_eq!(link.object.to_string(), "Sales.dbo.Orders");
    assert_eq!(link.actions.len(), 1);
    assert_eq!(link.actions[0].id, "select_top");
    assert_eq!(link.actions[0].query, "SELECT TOP 100 * FROM [Sales].[dbo].[Orders]");
}

#[test]
fn test_link_fills_default_schema() {
    let link = link("SELECT * FROM Customers", 16).unwrap();
    assert_eq!(link.object.schema, None);
    assert_eq!(link.actions[0].query, "SELECT TOP 100 * FROM [Sales].[dbo].[Customers]");
}

#[test]
fn test_procedure_link() {
    let link = link("EXEC dbo.GetOrders 1", 10).unwrap();
    assert_eq!(link.kind, ObjectKind::Procedure);
    assert_eq!(link.actions[0].query, "EXEC dbo.GetOrders");
}

#[test]
fn test_no_applicable_action_means_no_link() {
    // Functions have no configured action
    assert!(link("SELECT dbo.OrderTotal(1)", 12).is_none());
    // Temp tables are excluded by the predicate
    assert!(link("CREATE TABLE #t (a int)\nSELECT * FROM #t", 39).is_none());
    // Not on a name
    assert!(link("SELECT * FROM dbo.Orders o", 3).is_none());
}

#[test]
fn test_dialect_specific_actions() {
    let connection = ConnectionContext::new("test", STANDARD_DATABASE).with_dialect(Dialect::AzureSql);
    let link = link_with("SELECT dbo.OrderTotal(1)", 12, &connection).unwrap();
    assert_eq!(link.kind, ObjectKind::Function);
    assert_eq!(link.actions.len(), 1);
    assert_eq!(link.actions[0].query, "-- azure_sql function OrderTotal");
}

#[test]
fn test_links_do_not_need_a_catalog() {
    let catalogs = UnavailableCatalog::new();
    let session = session_with("SELECT * FROM dbo.Orders o", &catalogs);
    let classifier = NodeKindClassifier::tsql();
    let connection = ConnectionContext::new("test", STANDARD_DATABASE);
    let link = LinkResolver::new(&classifier, &connection)
        .resolve_link(&session, 20, &actions(), &JinjaTemplates::new())
        .unwrap();
    assert_eq!(link.actions[0].id, "select_top");
}
