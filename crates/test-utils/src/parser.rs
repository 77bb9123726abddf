// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fixture T-SQL grammar
//!
//! A small error-tolerant recursive-descent parser covering the statements
//! the analysis crates are tested with: SELECT (joins, APPLY, derived
//! tables, set operators, INTO), UPDATE, DELETE, INSERT, CREATE TABLE,
//! DECLARE and EXEC. It emits trees in the shape of the T-SQL rule table in
//! [`tsql_insight_grammar::rules::tsql`].
//!
//! The parser never gives up: unexpected tokens are wrapped in error nodes
//! and missing tokens are reported without consuming input.

use tsql_insight_grammar::rules::tsql;
use tsql_insight_grammar::{Grammar, ParseOutput, RuleId, SyntaxError, Token, TokenStream, TreeBuilder};
use tracing::trace;

use crate::lexer::tokenize;

const RESERVED: &[&str] = &[
    "ALL", "AND", "APPLY", "AS", "ASC", "BEGIN", "BETWEEN", "BY", "CASE", "CHANGETABLE", "CREATE",
    "CROSS", "DECLARE", "DELETE", "DESC", "DISTINCT", "ELSE", "END", "EXCEPT", "EXEC", "EXECUTE",
    "EXISTS", "FROM", "FULL", "GO", "GROUP", "HAVING", "IF", "IN", "INNER", "INSERT", "INTERSECT",
    "INTO", "IS", "JOIN", "LEFT", "LIKE", "NOT", "NULL", "ON", "OPTION", "OR", "ORDER", "OUTER",
    "OUTPUT", "PERCENT", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TOP", "UNION", "UPDATE",
    "VALUES", "WHEN", "WHERE", "WITH",
];

const STATEMENT_START: &[&str] = &[
    "SELECT", "UPDATE", "DELETE", "INSERT", "CREATE", "DECLARE", "EXEC", "EXECUTE", "GO",
];

const COMPARISON: &[&str] = &["=", "<>", "!=", "<", ">", "<=", ">=", "!<", "!>"];

const BINARY: &[&str] = &["+", "-", "*", "/", "%", "&", "|", "^"];

/// Error-tolerant fixture grammar for T-SQL
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGrammar;

impl FixtureGrammar {
    pub fn new() -> Self {
        Self
    }
}

impl Grammar for FixtureGrammar {
    fn name(&self) -> &str {
        "fixture-tsql"
    }

    fn parse(&self, text: &str) -> ParseOutput {
        let tokens = tokenize(text);
        let mut parser = Parser::new(&tokens);
        parser.batch();
        let Parser {
            builder, errors, ..
        } = parser;
        match builder.finish(tokens) {
            Ok(tree) => ParseOutput::new(tree, errors),
            Err(err) => ParseOutput::failed(vec![SyntaxError::new(err.to_string(), 0..0)]),
        }
    }
}

/// Parse `text` with the fixture grammar
pub fn parse(text: &str) -> ParseOutput {
    FixtureGrammar.parse(text)
}

struct Parser<'t> {
    tokens: &'t TokenStream,
    /// Indices of default-channel tokens, EOF last
    significant: Vec<usize>,
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
    last_error_at: Option<usize>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t TokenStream) -> Self {
        let significant = tokens
            .iter()
            .filter(|t| !t.is_hidden())
            .map(|t| t.index)
            .collect();
        Self {
            tokens,
            significant,
            pos: 0,
            builder: TreeBuilder::new(),
            errors: Vec::new(),
            last_error_at: None,
        }
    }

    // ===== Token access =====

    fn nth(&self, n: usize) -> &'t Token {
        let tokens: &'t TokenStream = self.tokens;
        let last = self.significant.len() - 1;
        let index = self.significant[(self.pos + n).min(last)];
        &tokens.as_slice()[index]
    }

    fn current(&self) -> &'t Token {
        self.nth(0)
    }

    fn at_eof(&self) -> bool {
        self.current().is_eof()
    }

    fn at(&self, text: &str) -> bool {
        self.current().text.eq_ignore_ascii_case(text)
    }

    fn nth_at(&self, n: usize, text: &str) -> bool {
        self.nth(n).text.eq_ignore_ascii_case(text)
    }

    fn at_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|t| self.at(t))
    }

    fn is_name(token: &Token) -> bool {
        let Some(first) = token.text.chars().next() else {
            return false;
        };
        match first {
            '[' | '"' => true,
            '@' => false,
            c if c.is_alphabetic() || c == '_' || c == '#' => !RESERVED
                .iter()
                .any(|kw| kw.eq_ignore_ascii_case(&token.text)),
            _ => false,
        }
    }

    fn at_name(&self) -> bool {
        Self::is_name(self.current())
    }

    fn at_variable(&self) -> bool {
        self.current().text.starts_with('@')
    }

    fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        self.builder.token(self.current().index);
        self.pos += 1;
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&mut self, message: &str) {
        let token = self.current();
        if self.last_error_at == Some(token.index) {
            return;
        }
        self.last_error_at = Some(token.index);
        trace!(offset = token.start, message, "Syntax error");
        let found = if token.is_eof() {
            "<EOF>"
        } else {
            token.text.as_str()
        };
        self.errors.push(SyntaxError::new(
            format!("{} at '{}'", message, found),
            token.range(),
        ));
    }

    fn expect(&mut self, text: &str) -> bool {
        if self.eat(text) {
            return true;
        }
        self.error(&format!("expected '{}'", text));
        false
    }

    fn node<F: FnOnce(&mut Self)>(&mut self, rule: RuleId, body: F) {
        self.builder.start_node(rule);
        body(self);
        self.builder.finish_node();
    }

    // ===== Batch and statements =====

    fn batch(&mut self) {
        self.builder.start_node(tsql::BATCH);
        while !self.at_eof() {
            if self.eat(";") || self.eat("GO") {
                continue;
            }
            if self.at_statement_start() {
                self.node(tsql::SQL_CLAUSE, Self::statement);
            } else {
                self.builder.start_error();
                self.error("unexpected input");
                while !self.at_eof() && !self.at_statement_start() && !self.at(";") {
                    self.bump();
                }
                self.builder.finish_node();
            }
        }
        self.builder.token(self.current().index);
        self.builder.finish_node();
    }

    fn at_statement_start(&self) -> bool {
        self.at_any(STATEMENT_START) || (self.at("(") && self.nth_at(1, "SELECT"))
    }

    fn statement(&mut self) {
        if self.at("SELECT") || self.at("(") {
            self.select_statement();
        } else if self.at("UPDATE") {
            self.update_statement();
        } else if self.at("DELETE") {
            self.delete_statement();
        } else if self.at("INSERT") {
            self.insert_statement();
        } else if self.at("CREATE") {
            self.create_table();
        } else if self.at("DECLARE") {
            self.declare_statement();
        } else {
            self.execute_statement();
        }
    }

    fn select_statement(&mut self) {
        self.node(tsql::SELECT_STATEMENT, Self::query_expression);
    }

    fn query_expression(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.query_term();
        if self.at_any(&["UNION", "EXCEPT", "INTERSECT"]) {
            self.builder.start_node_at(checkpoint, tsql::QUERY_EXPRESSION);
            while self.at_any(&["UNION", "EXCEPT", "INTERSECT"]) {
                self.bump();
                self.eat("ALL");
                self.query_term();
            }
            self.builder.finish_node();
        }
    }

    fn query_term(&mut self) {
        if self.at("(") {
            self.bump();
            self.query_expression();
            self.expect(")");
        } else {
            self.query_specification();
        }
    }

    fn query_specification(&mut self) {
        self.builder.start_node(tsql::QUERY_SPECIFICATION);
        self.expect("SELECT");
        if !self.eat("DISTINCT") {
            self.eat("ALL");
        }
        if self.eat("TOP") {
            self.operand();
            self.eat("PERCENT");
        }
        self.select_list();
        if self.at("INTO") {
            self.node(tsql::INTO_CLAUSE, |p| {
                p.bump();
                p.full_table_name();
            });
        }
        if self.at("FROM") {
            self.node(tsql::FROM_CLAUSE, |p| {
                p.bump();
                p.table_sources();
            });
        }
        self.where_clause();
        if self.at("GROUP") {
            self.node(tsql::GROUP_BY_CLAUSE, |p| {
                p.bump();
                p.expect("BY");
                p.expression_list();
            });
        }
        if self.eat("HAVING") {
            self.search_condition();
        }
        if self.at("ORDER") {
            self.node(tsql::ORDER_BY_CLAUSE, |p| {
                p.bump();
                p.expect("BY");
                loop {
                    p.expression();
                    if !p.eat("ASC") {
                        p.eat("DESC");
                    }
                    if !p.eat(",") {
                        break;
                    }
                }
            });
        }
        self.builder.finish_node();
    }

    fn where_clause(&mut self) {
        if self.at("WHERE") {
            self.node(tsql::WHERE_CLAUSE, |p| {
                p.bump();
                p.search_condition();
            });
        }
    }

    fn select_list(&mut self) {
        self.node(tsql::SELECT_LIST, |p| loop {
            p.select_list_elem();
            if !p.eat(",") {
                break;
            }
        });
    }

    fn select_list_elem(&mut self) {
        self.node(tsql::SELECT_LIST_ELEM, |p| {
            if p.at("*") {
                p.bump();
                return;
            }
            if p.at_name() && p.nth_at(1, "=") {
                p.node(tsql::COLUMN_ALIAS, Self::id);
                p.bump();
                p.expression();
                return;
            }
            p.expression();
            if p.eat("AS") {
                p.column_alias();
            } else if p.at_name() || p.current().text.starts_with('\'') {
                p.column_alias();
            }
        });
    }

    fn column_alias(&mut self) {
        if self.at_name() || self.current().text.starts_with('\'') {
            self.node(tsql::COLUMN_ALIAS, |p| p.node(tsql::ID, Self::bump));
        } else {
            self.error("expected column alias");
        }
    }

    // ===== Table sources =====

    fn table_sources(&mut self) {
        self.node(tsql::TABLE_SOURCES, |p| {
            p.table_source_item();
            loop {
                if p.eat(",") {
                    p.table_source_item();
                } else if p.at_join() {
                    p.join_part();
                } else if p.at_any(&["CROSS", "OUTER"]) && p.nth_at(1, "APPLY") {
                    p.node(tsql::APPLY_PART, |p| {
                        p.bump();
                        p.bump();
                        p.table_source_item();
                    });
                } else {
                    break;
                }
            }
        });
    }

    fn at_join(&self) -> bool {
        self.at("JOIN")
            || self.at("INNER")
            || (self.at_any(&["LEFT", "RIGHT", "FULL"]))
            || (self.at("CROSS") && self.nth_at(1, "JOIN"))
    }

    fn join_part(&mut self) {
        self.node(tsql::JOIN_PART, |p| {
            let cross = p.at("CROSS");
            if p.at_any(&["LEFT", "RIGHT", "FULL"]) {
                p.bump();
                p.eat("OUTER");
            } else if p.at("INNER") || cross {
                p.bump();
            }
            p.expect("JOIN");
            p.table_source_item();
            if !cross && p.expect("ON") {
                p.search_condition();
            }
        });
    }

    fn table_source_item(&mut self) {
        self.node(tsql::TABLE_SOURCE_ITEM, |p| {
            if p.at("(") && p.nth_at(1, "SELECT") {
                p.node(tsql::DERIVED_TABLE, |p| {
                    p.subquery();
                    p.table_alias();
                    if p.at("(") {
                        p.node(tsql::COLUMN_NAME_LIST, Self::paren_id_list);
                    }
                });
                return;
            }
            if p.at("(") {
                p.bump();
                p.table_sources();
                p.expect(")");
                return;
            }
            if p.at("CHANGETABLE") {
                p.node(tsql::CHANGE_TABLE, |p| {
                    p.bump();
                    p.expect("(");
                    p.eat("CHANGES");
                    p.full_table_name();
                    while p.eat(",") {
                        p.expression();
                    }
                    p.expect(")");
                });
            } else if p.at_variable() {
                p.node(tsql::TABLE_VARIABLE, |p| p.node(tsql::ID, Self::bump));
            } else if p.at_name() && p.dotted_name_followed_by_paren() {
                p.node(tsql::FUNCTION_CALL, Self::function_call_body);
            } else if p.at_name() {
                p.full_table_name();
            } else {
                p.error("expected table source");
                return;
            }
            p.table_alias();
            p.table_hints();
        });
    }

    fn table_alias(&mut self) {
        if self.eat("AS") {
            if self.at_name() {
                self.node(tsql::TABLE_ALIAS, Self::id);
            } else {
                self.error("expected alias");
            }
        } else if self.at_name() {
            self.node(tsql::TABLE_ALIAS, Self::id);
        }
    }

    fn table_hints(&mut self) {
        if self.at("WITH") && self.nth_at(1, "(") {
            self.bump();
            self.skip_parenthesized();
        }
    }

    fn subquery(&mut self) {
        self.node(tsql::SUBQUERY, |p| {
            p.expect("(");
            p.select_statement();
            p.expect(")");
        });
    }

    /// Whether the name at the cursor (possibly dotted) is followed by `(`
    fn dotted_name_followed_by_paren(&self) -> bool {
        let mut n = 0;
        loop {
            if !Self::is_name(self.nth(n)) {
                return false;
            }
            if self.nth_at(n + 1, ".") {
                n += 2;
            } else {
                return self.nth_at(n + 1, "(");
            }
        }
    }

    fn id(&mut self) {
        self.node(tsql::ID, Self::bump);
    }

    fn dotted_name(&mut self) {
        if self.at_name() {
            self.id();
        } else {
            self.error("expected identifier");
        }
        let mut parts = 1;
        while self.at(".") && parts < 4 {
            self.bump();
            parts += 1;
            if self.at(".") {
                continue;
            }
            if self.at_name() {
                self.id();
            } else {
                self.error("expected identifier");
                break;
            }
        }
    }

    fn full_table_name(&mut self) {
        self.node(tsql::FULL_TABLE_NAME, Self::dotted_name);
    }

    fn paren_id_list(&mut self) {
        self.expect("(");
        loop {
            if self.at_name() {
                self.id();
            } else {
                self.error("expected column name");
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")");
    }

    fn skip_parenthesized(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            if self.at("(") {
                depth += 1;
            } else if self.at(")") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.bump();
                    return;
                }
            }
            self.bump();
        }
    }

    // ===== Conditions and expressions =====

    fn search_condition(&mut self) {
        self.node(tsql::SEARCH_CONDITION, |p| loop {
            p.predicate_or_group();
            if !(p.eat("AND") || p.eat("OR")) {
                break;
            }
        });
    }

    fn predicate_or_group(&mut self) {
        while self.eat("NOT") {}
        if self.at("EXISTS") {
            self.node(tsql::EXISTS_PREDICATE, |p| {
                p.bump();
                p.subquery();
            });
            return;
        }
        if self.at("(") && !self.nth_at(1, "SELECT") {
            self.bump();
            self.search_condition();
            self.expect(")");
            return;
        }
        let checkpoint = self.builder.checkpoint();
        self.expression();
        if self.at_any(COMPARISON) {
            self.builder.start_node_at(checkpoint, tsql::PREDICATE);
            self.bump();
            self.expression();
            self.builder.finish_node();
        } else if self.at("IS") {
            self.builder.start_node_at(checkpoint, tsql::PREDICATE);
            self.bump();
            self.eat("NOT");
            self.expect("NULL");
            self.builder.finish_node();
        } else if self.at_any(&["IN", "LIKE", "BETWEEN"]) || (self.at("NOT") && self.nth_at(1, "IN")) {
            self.builder.start_node_at(checkpoint, tsql::PREDICATE);
            self.eat("NOT");
            if self.eat("IN") {
                if self.at("(") && self.nth_at(1, "SELECT") {
                    self.subquery();
                } else {
                    self.expect("(");
                    self.expression_list();
                    self.expect(")");
                }
            } else if self.eat("BETWEEN") {
                self.expression();
                self.expect("AND");
                self.expression();
            } else {
                self.bump();
                self.expression();
            }
            self.builder.finish_node();
        }
    }

    fn expression_list(&mut self) {
        loop {
            self.expression();
            if !self.eat(",") {
                break;
            }
        }
    }

    fn expression(&mut self) {
        self.node(tsql::EXPRESSION, |p| {
            p.operand();
            while p.at_any(BINARY) {
                p.bump();
                p.operand();
            }
        });
    }

    fn operand(&mut self) {
        let token = self.current();
        if self.at("(") && self.nth_at(1, "SELECT") {
            self.subquery();
        } else if self.at("(") {
            self.bump();
            self.expression_list();
            self.expect(")");
        } else if self.at("CASE") {
            self.case_expression();
        } else if self.at_any(&["-", "+", "~"]) {
            self.bump();
            self.operand();
        } else if self.at("NULL") || self.at_variable() || starts_literal(&token.text) {
            self.bump();
        } else if self.at_name() && self.dotted_name_followed_by_paren() {
            self.node(tsql::FUNCTION_CALL, Self::function_call_body);
        } else if self.at_name() {
            self.node(tsql::FULL_COLUMN_NAME, Self::dotted_name);
        } else {
            self.error("expected expression");
        }
    }

    fn case_expression(&mut self) {
        self.bump();
        if !self.at("WHEN") {
            self.expression();
        }
        while self.eat("WHEN") {
            self.search_condition();
            self.expect("THEN");
            self.expression();
        }
        if self.eat("ELSE") {
            self.expression();
        }
        self.expect("END");
    }

    fn function_call_body(&mut self) {
        self.node(tsql::FUNC_PROC_NAME, Self::dotted_name);
        self.expect("(");
        if self.eat("*") {
            self.expect(")");
            return;
        }
        self.eat("DISTINCT");
        if !self.at(")") {
            self.expression_list();
        }
        self.expect(")");
    }

    // ===== DML =====

    fn dml_target(&mut self) {
        self.node(tsql::DML_TARGET, |p| {
            if p.at_variable() {
                p.node(tsql::TABLE_VARIABLE, |p| p.node(tsql::ID, Self::bump));
            } else {
                p.full_table_name();
            }
        });
    }

    fn top_clause(&mut self) {
        if self.eat("TOP") {
            self.operand();
            self.eat("PERCENT");
        }
    }

    fn update_statement(&mut self) {
        self.node(tsql::UPDATE_STATEMENT, |p| {
            p.bump();
            p.top_clause();
            p.dml_target();
            p.table_hints();
            p.expect("SET");
            loop {
                p.node(tsql::UPDATE_ELEM, |p| {
                    if p.at_variable() {
                        p.bump();
                    } else {
                        p.node(tsql::FULL_COLUMN_NAME, Self::dotted_name);
                    }
                    if p.at_any(&["=", "+=", "-=", "*=", "/="]) {
                        p.bump();
                    } else {
                        p.error("expected '='");
                    }
                    p.expression();
                });
                if !p.eat(",") {
                    break;
                }
            }
            if p.at("FROM") {
                p.node(tsql::FROM_CLAUSE, |p| {
                    p.bump();
                    p.table_sources();
                });
            }
            p.where_clause();
        });
    }

    fn delete_statement(&mut self) {
        self.node(tsql::DELETE_STATEMENT, |p| {
            p.bump();
            p.top_clause();
            p.eat("FROM");
            p.dml_target();
            p.table_hints();
            if p.at("FROM") {
                p.node(tsql::FROM_CLAUSE, |p| {
                    p.bump();
                    p.table_sources();
                });
            }
            p.where_clause();
        });
    }

    fn insert_statement(&mut self) {
        self.node(tsql::INSERT_STATEMENT, |p| {
            p.bump();
            p.eat("INTO");
            p.dml_target();
            if p.at("(") && !p.nth_at(1, "SELECT") {
                p.node(tsql::COLUMN_NAME_LIST, Self::paren_id_list);
            }
            if p.eat("VALUES") {
                loop {
                    p.expect("(");
                    p.expression_list();
                    p.expect(")");
                    if !p.eat(",") {
                        break;
                    }
                }
            } else if p.at("SELECT") || p.at("(") {
                p.select_statement();
            } else if p.at_any(&["EXEC", "EXECUTE"]) {
                p.execute_statement();
            } else {
                p.error("expected VALUES or SELECT");
            }
        });
    }

    // ===== DDL and procedural =====

    fn create_table(&mut self) {
        self.node(tsql::CREATE_TABLE, |p| {
            p.bump();
            p.expect("TABLE");
            p.full_table_name();
            p.column_definitions();
        });
    }

    fn column_definitions(&mut self) {
        if !self.expect("(") {
            return;
        }
        loop {
            if self.at_any(&["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK", "INDEX"]) {
                self.skip_definition_tail();
            } else if self.at_name() {
                self.node(tsql::COLUMN_DEFINITION, |p| {
                    p.id();
                    p.skip_definition_tail();
                });
            } else {
                self.error("expected column definition");
                self.skip_definition_tail();
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")");
    }

    /// Consume tokens up to the next top-level `,` or `)`
    fn skip_definition_tail(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            if depth == 0 && (self.at(",") || self.at(")")) {
                return;
            }
            if self.at("(") {
                depth += 1;
            } else if self.at(")") {
                depth -= 1;
            }
            self.bump();
        }
    }

    fn declare_statement(&mut self) {
        self.node(tsql::DECLARE_STATEMENT, |p| {
            p.bump();
            loop {
                if p.at_variable() {
                    p.id();
                } else {
                    p.error("expected variable name");
                    return;
                }
                p.eat("AS");
                if p.at("TABLE") {
                    p.bump();
                    p.node(tsql::TABLE_TYPE_DEFINITION, Self::column_definitions);
                } else {
                    p.data_type();
                    if p.eat("=") {
                        p.expression();
                    }
                }
                if !p.eat(",") {
                    break;
                }
            }
        });
    }

    fn data_type(&mut self) {
        if self.at_name() {
            self.bump();
            while self.at(".") {
                self.bump();
                if self.at_name() {
                    self.bump();
                }
            }
            if self.at("(") {
                self.skip_parenthesized();
            }
        } else {
            self.error("expected data type");
        }
    }

    fn execute_statement(&mut self) {
        self.node(tsql::EXECUTE_STATEMENT, |p| {
            p.bump();
            if p.at_variable() && p.nth_at(1, "=") {
                p.bump();
                p.bump();
            }
            if !p.at_name() {
                p.error("expected procedure name");
                return;
            }
            p.node(tsql::FUNC_PROC_NAME, Self::dotted_name);
            if p.at_statement_start() || p.at(";") || p.at_eof() {
                return;
            }
            loop {
                if p.at_variable() && p.nth_at(1, "=") {
                    p.bump();
                    p.bump();
                }
                p.expression();
                p.eat("OUTPUT");
                if !p.eat(",") {
                    break;
                }
            }
        });
    }
}

fn starts_literal(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some('\'') => true,
        Some(c) if c.is_ascii_digit() => true,
        Some('N') | Some('n') => chars.next() == Some('\''),
        _ => false,
    }
}
