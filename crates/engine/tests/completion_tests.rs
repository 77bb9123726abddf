// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Completion over the shared SQL fixtures

use tsql_insight_catalog::{CatalogProvider, ConnectionContext};
use tsql_insight_context::NodeKindClassifier;
use tsql_insight_engine::{CompletionEngine, CompletionItemKind, CompletionResult};
use tsql_insight_grammar::rules::tsql;
use tsql_insight_grammar::{NoRules, RuleOracle};
use tsql_insight_semantic::{ParseSession, Validator};
use tsql_insight_test_utils::{
    FixtureGrammar, HeuristicRuleOracle, MockRuleOracle, STANDARD_DATABASE, SqlFixtures,
    UnavailableCatalog, init_tracing, split_cursor, standard_catalog,
};

fn complete_with(
    marked: &str,
    catalogs: &dyn CatalogProvider,
    oracle: &dyn RuleOracle,
    max_items: usize,
) -> CompletionResult {
    init_tracing();
    let (sql, offset) = split_cursor(marked).expect("fixture has a caret");
    let classifier = NodeKindClassifier::tsql();
    let connection = ConnectionContext::new("test", STANDARD_DATABASE);
    let validator = Validator::new(&classifier, catalogs, &connection);
    let session = ParseSession::build(&sql, &FixtureGrammar::new(), &validator)
        .expect("fixture grammar builds trees");
    let at = session.resolve_offset(offset).expect("caret inside document");
    CompletionEngine::new(&classifier, &connection)
        .with_max_items(max_items)
        .suggest(&session, &at, catalogs, oracle, STANDARD_DATABASE)
}

fn complete(marked: &str) -> CompletionResult {
    complete_with(marked, standard_catalog().as_ref(), &HeuristicRuleOracle, 200)
}

// ===== Columns =====

#[test]
fn test_select_list_of_join_lists_both_sources() {
    let result = complete(SqlFixtures::join_select_list());
    assert!(!result.partial);
    assert_eq!(
        result.replacements(),
        vec![
            "c.Email",
            "c.Id",
            "c.Name",
            "o.CustomerId",
            "o.Id",
            "o.OrderDate",
            "o.Status",
            "o.Total",
        ]
    );
    assert!(result.items.iter().all(|i| i.kind == CompletionItemKind::Column));
}

#[test]
fn test_qualified_column_filters_by_alias() {
    let result = complete(SqlFixtures::qualified_column());
    assert_eq!(result.len(), 5);
    assert!(result.items.iter().all(|i| i.match_parts[0] == "o"));

    let total = result
        .items
        .iter()
        .find(|i| i.replacement_text == "o.Total")
        .unwrap();
    assert_eq!(total.detail.as_deref(), Some("decimal(10, 2)"));
}

#[test]
fn test_caret_before_closing_paren() {
    let result = complete("SELECT * FROM dbo.Customers c WHERE (c.Id = |)");
    assert_eq!(result.replacements(), vec!["c.Email", "c.Id", "c.Name"]);
}

#[test]
fn test_qualifier_in_join_condition() {
    let result = complete(SqlFixtures::join_on_clause());
    assert_eq!(result.replacements(), vec!["c.Email", "c.Id", "c.Name"]);
}

#[test]
fn test_unknown_qualifier_yields_nothing() {
    let result = complete("SELECT * FROM dbo.Orders o WHERE zz.|");
    assert!(result.is_empty());
    assert!(!result.partial);
}

#[test]
fn test_derived_table_projection() {
    let result = complete(SqlFixtures::derived_table_where());
    assert_eq!(result.replacements(), vec!["s.x"]);
}

#[test]
fn test_derived_table_does_not_see_outer_sources() {
    let result = complete(SqlFixtures::derived_table_isolation());
    assert_eq!(result.replacements(), vec!["c.Email", "c.Id", "c.Name"]);
}

#[test]
fn test_exists_bridge_sees_outer_alias() {
    let result = complete(SqlFixtures::exists_correlation());
    assert_eq!(result.len(), 5);
    assert!(result.items.iter().any(|i| i.replacement_text == "o.Total"));
    assert!(!result.items.iter().any(|i| i.replacement_text.starts_with("c.")));
}

#[test]
fn test_change_table_exposes_key_and_system_columns() {
    let result = complete(SqlFixtures::change_table());
    assert_eq!(
        result.replacements(),
        vec![
            "ct.Id",
            "ct.SYS_CHANGE_COLUMNS",
            "ct.SYS_CHANGE_CONTEXT",
            "ct.SYS_CHANGE_CREATION_VERSION",
            "ct.SYS_CHANGE_OPERATION",
            "ct.SYS_CHANGE_VERSION",
        ]
    );
}

#[test]
fn test_table_function_result_columns() {
    let result = complete("SELECT | FROM dbo.OrdersByCustomer(1) f");
    assert_eq!(result.replacements(), vec!["f.OrderId", "f.Total"]);
}

#[test]
fn test_temp_table_columns_come_from_registry() {
    let result = complete("CREATE TABLE #t (a int, b int)\nSELECT | FROM #t");
    assert_eq!(result.replacements(), vec!["a", "b"]);

    let result = complete("CREATE TABLE #t (a int, b int)\nSELECT | FROM #t x");
    assert_eq!(result.replacements(), vec!["x.a", "x.b"]);
}

#[test]
fn test_duplicate_replacements_are_dropped() {
    let sql = "CREATE TABLE #t (a int, b int)\nCREATE TABLE #u (a int)\nSELECT | FROM #t, #u";
    let result = complete(sql);
    assert_eq!(result.replacements(), vec!["a", "b"]);
}

// ===== Tables and routines =====

#[test]
fn test_tables_after_from() {
    let result = complete(SqlFixtures::table_position());
    assert_eq!(
        result.replacements(),
        vec![
            "archive.Orders",
            "dbo.ActiveOrders",
            "dbo.Customers",
            "dbo.Orders",
            "dbo.Table1",
        ]
    );
    assert_eq!(result.items[1].kind, CompletionItemKind::View);
    assert_eq!(result.items[0].kind, CompletionItemKind::Table);
}

#[test]
fn test_partial_table_name_uses_the_tree() {
    // No oracle: the table source around the caret decides
    let result = complete_with(
        "SELECT * FROM dbo.Ord|",
        standard_catalog().as_ref(),
        &NoRules,
        200,
    );
    assert_eq!(result.len(), 5);
    assert!(result.items.iter().all(|i| matches!(
        i.kind,
        CompletionItemKind::Table | CompletionItemKind::View
    )));
}

#[test]
fn test_temp_objects_sort_before_catalog_tables() {
    let sql = "CREATE TABLE #recent (OrderId int)\nDECLARE @ids TABLE (Id int)\nSELECT * FROM |";
    let result = complete(sql);
    assert_eq!(result.len(), 7);
    assert_eq!(result.items[0].replacement_text, "#recent");
    assert_eq!(result.items[0].kind, CompletionItemKind::TempTable);
    assert_eq!(result.items[1].replacement_text, "@ids");
    assert_eq!(result.items[1].kind, CompletionItemKind::TableVariable);
}

#[test]
fn test_routines_after_exec() {
    let result = complete(SqlFixtures::routine_position());
    assert_eq!(
        result.replacements(),
        vec!["dbo.GetOrders", "dbo.OrdersByCustomer", "dbo.OrderTotal"]
    );
    let kinds: Vec<_> = result.items.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CompletionItemKind::Procedure,
            CompletionItemKind::Function,
            CompletionItemKind::Function,
        ]
    );
    assert_eq!(
        result.items[0].detail.as_deref(),
        Some("dbo.GetOrders(@CustomerId int)")
    );
}

#[test]
fn test_max_items_caps_after_sorting() {
    let result = complete_with(
        SqlFixtures::table_position(),
        standard_catalog().as_ref(),
        &HeuristicRuleOracle,
        2,
    );
    assert_eq!(result.replacements(), vec!["archive.Orders", "dbo.ActiveOrders"]);
    assert!(!result.partial);
}

// ===== Oracle =====

#[test]
fn test_oracle_union_orders_columns_tables_routines() {
    let oracle = MockRuleOracle::always(&[
        tsql::FULL_COLUMN_NAME,
        tsql::FULL_TABLE_NAME,
        tsql::FUNC_PROC_NAME,
    ]);
    let result = complete_with(
        "SELECT | FROM dbo.Orders o",
        standard_catalog().as_ref(),
        &oracle,
        200,
    );
    assert_eq!(result.len(), 13);
    assert!(result.items[..5].iter().all(|i| i.kind == CompletionItemKind::Column));
    assert_eq!(result.items[5].replacement_text, "archive.Orders");
    assert_eq!(result.items[12].replacement_text, "dbo.OrderTotal");
}

#[test]
fn test_no_reachable_rules_yields_nothing() {
    let result = complete_with(
        "SELECT | FROM dbo.Orders o",
        standard_catalog().as_ref(),
        &NoRules,
        200,
    );
    assert!(result.is_empty());
    assert!(!result.partial);
}

// ===== Degraded catalogs =====

#[test]
fn test_unavailable_catalog_marks_result_partial() {
    let catalogs = UnavailableCatalog::new();
    let result = complete_with(SqlFixtures::qualified_column(), &catalogs, &HeuristicRuleOracle, 200);
    assert!(result.is_empty());
    assert!(result.partial);

    let result = complete_with(SqlFixtures::table_position(), &catalogs, &HeuristicRuleOracle, 200);
    assert!(result.partial);
}

#[test]
fn test_catalog_lookups_are_cached_per_request() {
    let catalogs = UnavailableCatalog::new();
    let before = catalogs.lookups();
    let result = complete_with(
        SqlFixtures::join_select_list(),
        &catalogs,
        &HeuristicRuleOracle,
        200,
    );
    assert!(result.partial);
    // Parse-time validation may look up too; completion adds a single lookup
    // for the two `Sales` sources
    let validation = {
        let classifier = NodeKindClassifier::tsql();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let counter = UnavailableCatalog::new();
        let validator = Validator::new(&classifier, &counter, &connection);
        let (sql, _) = split_cursor(SqlFixtures::join_select_list()).unwrap();
        ParseSession::build(&sql, &FixtureGrammar::new(), &validator).unwrap();
        counter.lookups()
    };
    assert_eq!(catalogs.lookups() - before, validation + 1);
}
