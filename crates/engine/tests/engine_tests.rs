// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Engine façade, documents and protocol conversion

use std::sync::Arc;

use lsp_types::{DiagnosticSeverity, HoverContents, NumberOrString, Position};
use tsql_insight_engine::lsp::{
    DIAGNOSTIC_SOURCE, RUN_ACTION_COMMAND, to_commands, to_hover, to_lsp_diagnostics,
};
use tsql_insight_engine::{
    ActionDefinition, ConfigError, ConfiguredActions, EngineConfig, EngineError, SqlEngine,
};
use tsql_insight_grammar::{Grammar, ParseOutput};
use tsql_insight_ir::{Dialect, ObjectKind};
use tsql_insight_semantic::{DiagnosticCode, SessionError};
use tsql_insight_test_utils::{
    FixtureGrammar, HeuristicRuleOracle, STANDARD_DATABASE, init_tracing, standard_catalog,
};

const CONFIG_YAML: &str = r#"
dialect: azure_sql
connection:
  connection_id: reporting
  default_database: Sales
completion:
  max_items: 3
actions:
  - id: select_top
    title: Select top 100
    object_kinds: [table, view]
    predicate: not_temp
    query: "SELECT TOP 100 * FROM [{{schema}}].[{{name}}]"
tooltip_templates:
  view: "view {{schema}}.{{name}}"
"#;

fn engine_with(config: EngineConfig) -> SqlEngine {
    init_tracing();
    SqlEngine::new(
        config,
        Arc::new(FixtureGrammar::new()),
        standard_catalog(),
        Arc::new(HeuristicRuleOracle),
    )
    .expect("valid configuration")
}

fn engine() -> SqlEngine {
    engine_with(EngineConfig::from_yaml_str(CONFIG_YAML).unwrap())
}

/// Grammar that never produces a tree
struct BrokenGrammar;

impl Grammar for BrokenGrammar {
    fn name(&self) -> &str {
        "broken"
    }

    fn parse(&self, _text: &str) -> ParseOutput {
        ParseOutput::failed(Vec::new())
    }
}

// ===== Configuration =====

#[test]
fn test_yaml_configuration() {
    let config = EngineConfig::from_yaml_str(CONFIG_YAML).unwrap();
    assert_eq!(config.dialect, Dialect::AzureSql);
    assert_eq!(config.connection.connection_id, "reporting");
    assert_eq!(config.completion.max_items, 3);
    assert_eq!(config.actions.len(), 1);
    assert_eq!(config.actions[0].object_kinds, vec![ObjectKind::Table, ObjectKind::View]);
    assert_eq!(config.tooltip_templates["view"], "view {{schema}}.{{name}}");
}

#[test]
fn test_json_and_builder_agree() {
    let json = r#"{
        "connection": {"connection_id": "local", "default_database": "Sales"},
        "actions": [{"id": "exec", "title": "Execute", "object_kinds": ["procedure"], "query": "EXEC {{name}}"}],
        "tooltip_templates": {"table": "{{name}}"}
    }"#;
    let built = EngineConfig::new("local", "Sales")
        .with_action(
            ActionDefinition::new("exec", "Execute", "EXEC {{name}}")
                .for_kinds(&[ObjectKind::Procedure]),
        )
        .with_tooltip_template(ObjectKind::Table, "{{name}}");
    assert_eq!(EngineConfig::from_json_str(json).unwrap(), built);
}

#[test]
fn test_engine_rejects_invalid_configuration() {
    let config = EngineConfig::new("local", "Sales")
        .with_action(ActionDefinition::new("open", "Open", "SELECT 1"))
        .with_action(ActionDefinition::new("open", "Open again", "SELECT 2"));
    let result = SqlEngine::new(
        config,
        Arc::new(FixtureGrammar::new()),
        standard_catalog(),
        Arc::new(HeuristicRuleOracle),
    );
    assert_eq!(
        result.err(),
        Some(EngineError::Config(ConfigError::DuplicateAction("open".to_string())))
    );

    let config = EngineConfig::new("local", "Sales")
        .with_tooltip_template(ObjectKind::Procedure, "{% if comment %}{{ comment }}");
    let result = SqlEngine::new(
        config,
        Arc::new(FixtureGrammar::new()),
        standard_catalog(),
        Arc::new(HeuristicRuleOracle),
    );
    assert!(matches!(
        result,
        Err(EngineError::Config(ConfigError::InvalidTemplate { .. }))
    ));

    let err = EngineConfig::from_yaml_str("connection:\n  connection_id: \"\"\n").unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingConnectionField {
            field: "connection_id"
        }
    );
}

// ===== Engine operations =====

#[test]
fn test_connection_comes_from_configuration() {
    let engine = engine();
    assert_eq!(engine.connection().connection_id, "reporting");
    assert_eq!(engine.connection().default_database, STANDARD_DATABASE);
    assert_eq!(engine.connection().dialect, Dialect::AzureSql);
}

#[test]
fn test_diagnostics_of_a_session() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM #z").unwrap();
    let diagnostics = engine.diagnostics(&session);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::MissingTempTable);
    assert_eq!(diagnostics[0].range(), 14..16);

    let clean = engine.parse("SELECT o.Id FROM dbo.Orders o").unwrap();
    assert!(engine.diagnostics(&clean).is_empty());
}

#[test]
fn test_completion_respects_configured_cap() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM ").unwrap();
    let result = engine.completion_items(&session, 14);
    assert_eq!(
        result.replacements(),
        vec!["archive.Orders", "dbo.ActiveOrders", "dbo.Customers"]
    );
}

#[test]
fn test_completion_outside_document_is_empty() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM ").unwrap();
    let result = engine.completion_items(&session, 99);
    assert!(result.is_empty());
    assert!(!result.partial);
}

#[test]
fn test_tooltip_uses_configured_override() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM dbo.ActiveOrders").unwrap();
    let tip = engine.tool_tip(&session, 20).unwrap();
    assert_eq!(tip.text, "view dbo.ActiveOrders");

    // Tables keep the default template
    let session = engine.parse("SELECT * FROM dbo.Orders").unwrap();
    let tip = engine.tool_tip(&session, 20).unwrap();
    assert!(tip.text.starts_with("**table** `Sales.dbo.Orders`"));
}

#[test]
fn test_cross_database_tooltip_depends_on_dialect() {
    let sql = "SELECT * FROM Hr.dbo.Employees";

    // Azure SQL Database cannot reach into another database
    let engine = engine();
    let session = engine.parse(sql).unwrap();
    assert!(engine.tool_tip(&session, 25).is_none());

    let engine = engine_with(EngineConfig::new("local", STANDARD_DATABASE));
    let session = engine.parse(sql).unwrap();
    let tip = engine.tool_tip(&session, 25).unwrap();
    assert!(tip.text.starts_with("**table** `Hr.dbo.Employees`"));
}

#[test]
fn test_link_uses_configured_actions() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM dbo.Orders o").unwrap();
    let link = engine.link_action(&session, 20).unwrap();
    assert_eq!(link.actions[0].query, "SELECT TOP 100 * FROM [dbo].[Orders]");

    // Nothing configured for procedures
    let session = engine.parse("EXEC dbo.GetOrders 1").unwrap();
    assert!(engine.link_action(&session, 10).is_none());
}

#[test]
fn test_action_source_can_be_replaced() {
    let actions = ConfiguredActions::new(vec![
        ActionDefinition::new("exec", "Execute", "EXEC {{schema}}.{{name}}")
            .for_kinds(&[ObjectKind::Procedure]),
    ]);
    let engine = engine().with_action_config(Arc::new(actions));
    let session = engine.parse("EXEC dbo.GetOrders 1").unwrap();
    let link = engine.link_action(&session, 10).unwrap();
    assert_eq!(link.actions[0].query, "EXEC dbo.GetOrders");
}

// ===== Documents =====

#[test]
fn test_document_edit_and_reparse() {
    let engine = engine();
    let mut document = engine.open_document("SELECT * FROM dbo.Orders o", 1).unwrap();
    assert!(!document.is_dirty());
    assert!(document.session().diagnostics().is_empty());

    document.apply_change(14..24, "#z", 2).unwrap();
    assert_eq!(document.text().to_string(), "SELECT * FROM #z o");
    assert_eq!(document.version(), 2);
    assert!(document.is_dirty());
    // The old session stays until the reparse
    assert!(document.session().diagnostics().is_empty());

    let session = engine.reparse(&mut document).unwrap();
    assert!(!document.is_dirty());
    assert_eq!(session.diagnostics()[0].code, DiagnosticCode::MissingTempTable);
    assert_eq!(session.text().to_string(), "SELECT * FROM #z o");
}

#[test]
fn test_invalid_edits_are_rejected() {
    let engine = engine();
    let mut document = engine.open_document("SELECT 1", 1).unwrap();
    assert_eq!(
        document.apply_change(5..2, "x", 2),
        Err(EngineError::InvalidEdit {
            start: 5,
            end: 2,
            len: 8
        })
    );
    assert!(document.apply_change(0..9, "x", 2).is_err());
    assert_eq!(document.version(), 1);
    assert!(!document.is_dirty());
}

#[test]
fn test_failed_reparse_keeps_previous_session() {
    let engine = engine();
    let mut document = engine.open_document("SELECT * FROM #z", 1).unwrap();
    document.replace_all("SELECT 1\nSELECT 2", 2);
    assert_eq!(document.line_count(), 2);

    let err = document
        .reparse(&BrokenGrammar, &engine.validator())
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::NoTree {
            grammar: "broken".to_string(),
            errors: 0
        }
    );
    assert!(document.is_dirty());
    assert_eq!(document.session().text().to_string(), "SELECT * FROM #z");
}

// ===== Protocol conversion =====

#[test]
fn test_lsp_diagnostics() {
    let engine = engine();
    let session = engine.parse("SELECT 1\nSELECT * FROM #z").unwrap();
    let diagnostics = to_lsp_diagnostics(session.text(), engine.diagnostics(&session));
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.range.start, Position::new(1, 14));
    assert_eq!(diagnostic.range.end, Position::new(1, 16));
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(
        diagnostic.code,
        Some(NumberOrString::String("missing-temp-table".to_string()))
    );
    assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
}

#[test]
fn test_lsp_hover_and_commands() {
    let engine = engine();
    let session = engine.parse("SELECT * FROM dbo.ActiveOrders").unwrap();

    let tip = engine.tool_tip(&session, 20).unwrap();
    let hover = to_hover(session.text(), &tip);
    let HoverContents::Markup(content) = hover.contents else {
        panic!("expected markdown content");
    };
    assert_eq!(content.value, "view dbo.ActiveOrders");
    let range = hover.range.unwrap();
    assert_eq!(range.start, Position::new(0, 14));
    assert_eq!(range.end, Position::new(0, 30));

    let link = engine.link_action(&session, 20).unwrap();
    let commands = to_commands(&link);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].command, RUN_ACTION_COMMAND);
    assert_eq!(commands[0].title, "Select top 100");
    let arguments = commands[0].arguments.as_ref().unwrap();
    assert_eq!(arguments[0], "select_top");
    assert_eq!(arguments[1], "Sales.dbo.ActiveOrders");
    assert_eq!(arguments[2], "SELECT TOP 100 * FROM [dbo].[ActiveOrders]");
}
