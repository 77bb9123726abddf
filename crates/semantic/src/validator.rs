// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Validator
//!
//! A single document-order pass over the whole tree that builds the
//! [`TempObjectRegistry`] and emits [`ParseDiagnostic`]s.
//!
//! ## Rules
//!
//! - `CREATE TABLE #t`, `DECLARE @t TABLE` and `SELECT ... INTO #t` declare
//!   temp objects
//! - a comparison whose operands have identical text is a warning
//! - a temp table or table variable used before any declaration is an error
//! - a persistent table missing from a loaded catalog is an error
//!
//! The target of an UPDATE or DELETE that carries its own FROM clause may be
//! an alias and is never checked. Unavailable catalogs suppress the
//! missing-table rule entirely.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use ropey::Rope;
use tracing::{debug, trace};
use tsql_insight_catalog::{CatalogLookup, CatalogProvider, ConnectionContext};
use tsql_insight_context::{NodeKind, NodeKindClassifier, cst_utils};
use tsql_insight_grammar::{NodeId, SyntaxError, SyntaxTree};
use tsql_insight_ir::ObjectName;

use crate::diagnostic::{DiagnosticCode, ParseDiagnostic, Severity};
use crate::registry::TempObjectRegistry;

const COMPARISON_OPERATORS: &[&str] = &["=", "<>", "!=", "<", ">", "<=", ">=", "!<", "!>"];

/// Result of validating one tree
#[derive(Debug, Clone, Default)]
pub struct ValidationOutput {
    pub registry: TempObjectRegistry,
    /// Syntax errors first, then semantic findings in document order
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Tree validator
pub struct Validator<'a> {
    classifier: &'a NodeKindClassifier,
    catalogs: &'a dyn CatalogProvider,
    connection: &'a ConnectionContext,
}

impl<'a> Validator<'a> {
    pub fn new(
        classifier: &'a NodeKindClassifier,
        catalogs: &'a dyn CatalogProvider,
        connection: &'a ConnectionContext,
    ) -> Self {
        Self {
            classifier,
            catalogs,
            connection,
        }
    }

    pub fn classifier(&self) -> &'a NodeKindClassifier {
        self.classifier
    }

    /// Validate a tree
    ///
    /// # Arguments
    ///
    /// * `tree` - The error-recovered syntax tree
    /// * `text` - Document text, used for line numbers
    /// * `syntax_errors` - Errors reported by the grammar
    pub fn validate(
        &self,
        tree: &SyntaxTree,
        text: &Rope,
        syntax_errors: &[SyntaxError],
    ) -> ValidationOutput {
        let mut pass = Pass {
            validator: self,
            tree,
            text,
            registry: TempObjectRegistry::new(),
            diagnostics: Vec::new(),
            created: HashSet::new(),
            lookups: HashMap::new(),
        };

        for error in syntax_errors {
            pass.report(
                DiagnosticCode::SyntaxError,
                Severity::Error,
                error.message.clone(),
                error.range.clone(),
            );
        }

        for node in tree.descendants(tree.root()) {
            pass.visit(node);
        }

        debug!(
            diagnostics = pass.diagnostics.len(),
            temp_objects = pass.registry.len(),
            "Validation finished"
        );
        ValidationOutput {
            registry: pass.registry,
            diagnostics: pass.diagnostics,
        }
    }
}

/// State of one validation pass
struct Pass<'v, 't> {
    validator: &'v Validator<'v>,
    tree: &'t SyntaxTree,
    text: &'t Rope,
    registry: TempObjectRegistry,
    diagnostics: Vec<ParseDiagnostic>,
    /// Persistent tables created earlier in the script
    created: HashSet<ObjectName>,
    /// Catalog answers, one lookup per database
    lookups: HashMap<String, CatalogLookup>,
}

impl Pass<'_, '_> {
    fn classify(&self, node: NodeId) -> NodeKind {
        self.validator.classifier.classify(self.tree, node)
    }

    fn child(&self, node: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.validator.classifier.child_of_kind(self.tree, node, kind)
    }

    fn default_database(&self) -> &str {
        &self.validator.connection.default_database
    }

    fn visit(&mut self, node: NodeId) {
        match self.classify(node) {
            NodeKind::CreateTable => self.declare_table(node),
            NodeKind::DeclareVariable => self.declare_variables(node),
            NodeKind::IntoClause => self.declare_select_into(node),
            NodeKind::Predicate => self.check_tautology(node),
            kind @ (NodeKind::TableReference | NodeKind::TableVariable) => {
                if self.is_source_reference(node) {
                    self.check_reference(node, kind);
                }
            }
            _ => {}
        }
    }

    // ===== Declarations =====

    fn declare_table(&mut self, node: NodeId) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let columns = self.column_definitions(node);
        self.declare(name, columns);
    }

    fn declare_variables(&mut self, node: NodeId) {
        let tree = self.tree;
        let mut variable = None;
        for &child in tree.children(node) {
            match self.classify(child) {
                NodeKind::Identifier => variable = Some(cst_utils::identifier_text(tree, child)),
                NodeKind::TableTypeDefinition => {
                    if let Some(name) = variable.take() {
                        let columns = self.column_definitions(child);
                        trace!(name = %name, "Table variable declared");
                        self.registry.register(name, columns);
                    }
                }
                _ => {}
            }
        }
    }

    fn declare_select_into(&mut self, node: NodeId) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let columns = self
            .tree
            .parent(node)
            .map(|block| cst_utils::projection_names(self.validator.classifier, self.tree, block))
            .unwrap_or_default();
        self.declare(name, columns);
    }

    fn declared_name(&self, node: NodeId) -> Option<ObjectName> {
        let reference = self.child(node, NodeKind::TableReference)?;
        cst_utils::qualified_name(self.validator.classifier, self.tree, reference).map(|q| q.object)
    }

    fn declare(&mut self, name: ObjectName, columns: Vec<String>) {
        if name.is_temp() {
            trace!(name = %name.name, columns = columns.len(), "Temp table declared");
            self.registry.register(name.name, columns);
        } else {
            let name = name.or_database(self.default_database());
            self.created.insert(name);
        }
    }

    /// First identifier of every column definition under `node`
    fn column_definitions(&self, node: NodeId) -> Vec<String> {
        self.tree
            .children(node)
            .iter()
            .filter(|&&child| self.classify(child) == NodeKind::ColumnDefinition)
            .filter_map(|&child| self.child(child, NodeKind::Identifier))
            .map(|id| cst_utils::identifier_text(self.tree, id))
            .collect()
    }

    // ===== Checks =====

    fn check_tautology(&mut self, node: NodeId) {
        let &[left, operator, right] = self.tree.children(node) else {
            return;
        };
        let is_comparison = self.classify(operator) == NodeKind::Terminal
            && COMPARISON_OPERATORS.contains(&self.tree.text(operator).as_str());
        if !is_comparison
            || self.classify(left) != NodeKind::Expression
            || self.classify(right) != NodeKind::Expression
        {
            return;
        }

        if cst_utils::same_text(self.tree, left, right) {
            let message = format!(
                "Tautological comparison: '{}' is compared with itself",
                self.tree.text(left)
            );
            self.report(
                DiagnosticCode::TautologicalComparison,
                Severity::Warning,
                message,
                self.tree.span(node),
            );
        }
    }

    /// Whether a name node sits where a table source is expected
    fn is_source_reference(&self, node: NodeId) -> bool {
        self.tree.parent(node).is_some_and(|parent| {
            matches!(
                self.classify(parent),
                NodeKind::TableSourceItem | NodeKind::DmlTarget | NodeKind::ChangeTable
            )
        })
    }

    /// UPDATE / DELETE target when the statement has a FROM clause
    fn is_aliased_dml_target(&self, node: NodeId) -> bool {
        let Some(target) = self.tree.parent(node) else {
            return false;
        };
        if self.classify(target) != NodeKind::DmlTarget {
            return false;
        }
        self.tree.parent(target).is_some_and(|statement| {
            self.classify(statement) == NodeKind::QueryBlock
                && self.child(statement, NodeKind::FromClause).is_some()
        })
    }

    fn check_reference(&mut self, node: NodeId, kind: NodeKind) {
        if self.is_aliased_dml_target(node) {
            trace!(span = ?self.tree.span(node), "DML target may be an alias");
            return;
        }

        if kind == NodeKind::TableVariable {
            let name = cst_utils::identifier_text(self.tree, node);
            self.check_temp(node, &name);
            return;
        }

        let Some(name) = cst_utils::qualified_name(self.validator.classifier, self.tree, node) else {
            return;
        };
        if name.object.is_temp() {
            self.check_temp(node, &name.object.name);
        } else if !name.is_server_qualified() {
            self.check_table(node, name.object);
        }
    }

    fn check_temp(&mut self, node: NodeId, name: &str) {
        if !self.registry.contains(name) {
            self.report(
                DiagnosticCode::MissingTempTable,
                Severity::Error,
                format!("Missing temp/variable table '{}'", name),
                self.tree.span(node),
            );
        }
    }

    fn check_table(&mut self, node: NodeId, name: ObjectName) {
        let name = name.or_database(self.default_database());
        if self.created.contains(&name) {
            return;
        }
        let database = name.database.clone().unwrap_or_default();

        let lookup = match self.lookups.get(&database.to_lowercase()) {
            Some(lookup) => lookup.clone(),
            None => {
                let lookup = self
                    .validator
                    .catalogs
                    .get_catalog(self.validator.connection, &database);
                self.lookups.insert(database.to_lowercase(), lookup.clone());
                lookup
            }
        };

        match lookup {
            CatalogLookup::Unavailable => {
                trace!(database = %database, "Catalog unavailable, table not checked");
            }
            CatalogLookup::Available(catalog) => {
                if catalog.find_table(&name).is_none() {
                    self.report(
                        DiagnosticCode::MissingTable,
                        Severity::Error,
                        format!("Missing table '{}' in database '{}'", name.name, database),
                        self.tree.span(node),
                    );
                }
            }
        }
    }

    fn report(
        &mut self,
        code: DiagnosticCode,
        severity: Severity,
        message: String,
        range: Range<usize>,
    ) {
        let line = self.text.char_to_line(range.start.min(self.text.len_chars()));
        self.diagnostics
            .push(ParseDiagnostic::new(code, severity, message, line, range));
    }
}
