// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion Engine
//!
//! Computes completion candidates at a resolved caret position.
//!
//! ## Flow
//!
//! 1. Pick the anchor node: the token under the caret, or the one before it
//!    when the caret sits in whitespace, at end of input or inside an error
//! 2. Climb from the anchor; the nearest expression context asks for
//!    columns, the nearest table source asks for tables
//! 3. When the climb reaches a query block or statement first, ask the
//!    [`RuleOracle`] which rules are reachable and union the contexts they
//!    map to
//! 4. Render, sort by kind weight and text, drop duplicate replacements and
//!    cap the list
//!
//! ## Qualified columns
//!
//! ```sql
//! SELECT * FROM dbo.Orders o JOIN dbo.Customers c ON c.|
//! ```
//!
//! Inside a dotted column reference only the sources answering to the
//! qualifier contribute; an unknown qualifier yields no items.

mod render;

pub use render::{CompletionItem, CompletionItemKind, CompletionRenderer, CompletionResult};

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};
use tsql_insight_catalog::{CatalogLookup, CatalogProvider, ConnectionContext};
use tsql_insight_context::cst_utils::name_parts;
use tsql_insight_context::{AliasKind, NodeKind, NodeKindClassifier, TableAlias, TokenOffset};
use tsql_insight_grammar::{NodeId, RuleOracle, SyntaxTree};
use tsql_insight_semantic::ParseSession;

use crate::config::DEFAULT_MAX_ITEMS;

/// What the caret position asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Context {
    /// Columns of the sources visible at the node
    Columns(NodeId),
    Tables,
    Routines,
}

/// Completion engine
pub struct CompletionEngine<'a> {
    classifier: &'a NodeKindClassifier,
    connection: &'a ConnectionContext,
    max_items: usize,
}

impl<'a> CompletionEngine<'a> {
    pub fn new(classifier: &'a NodeKindClassifier, connection: &'a ConnectionContext) -> Self {
        Self {
            classifier,
            connection,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Builder method: cap the number of returned items
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Compute completion items at a resolved position
    ///
    /// # Arguments
    ///
    /// * `session` - Parse session of the document
    /// * `at` - Position from [`ParseSession::resolve_offset`]
    /// * `catalogs` - Catalog provider; unavailable databases make the result partial
    /// * `oracle` - Reachable-rule oracle consulted when the tree is not conclusive
    /// * `default_database` - Database for names without a database part
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let at = session.resolve_offset(offset).unwrap();
    /// let result = CompletionEngine::new(&classifier, &connection)
    ///     .suggest(&session, &at, catalogs.as_ref(), &oracle, "Sales");
    /// assert!(result.items.iter().any(|i| i.replacement_text == "o.Total"));
    /// ```
    pub fn suggest(
        &self,
        session: &ParseSession,
        at: &TokenOffset,
        catalogs: &dyn CatalogProvider,
        oracle: &dyn RuleOracle,
        default_database: &str,
    ) -> CompletionResult {
        let tree = session.tree();
        let anchor = self.anchor(tree, at);
        let contexts = match self.syntactic_context(tree, anchor) {
            Some(context) => vec![context],
            None => self.oracle_contexts(session, at, oracle),
        };
        debug!(?contexts, "Completion contexts");

        let mut collector = Collector {
            session,
            catalogs,
            connection: self.connection,
            default_database,
            lookups: HashMap::new(),
            items: Vec::new(),
            partial: false,
        };
        for context in contexts {
            match context {
                Context::Columns(node) => {
                    // Only a reference under the caret is being typed
                    let qualifier = if node == at.node_at {
                        self.qualifier(tree, node)
                    } else {
                        None
                    };
                    collector.columns(self.classifier, node, qualifier.as_deref());
                }
                Context::Tables => collector.tables(),
                Context::Routines => collector.routines(),
            }
        }

        let Collector {
            mut items, partial, ..
        } = collector;
        items.sort_by_cached_key(CompletionItem::sort_key);
        let mut seen = HashSet::new();
        items.retain(|item| seen.insert(item.replacement_text.clone()));
        items.truncate(self.max_items);

        trace!(items = items.len(), partial, "Completion done");
        CompletionResult { items, partial }
    }

    /// Node the syntactic climb starts from
    fn anchor(&self, tree: &SyntaxTree, at: &TokenOffset) -> NodeId {
        let under_caret = tree.token(at.node_at).is_some_and(|token| {
            !token.is_eof() && at.suggest_token_index == Some(token.index)
        });
        let in_error = tree
            .parent(at.node_at)
            .is_some_and(|parent| tree.is_error(parent));
        if under_caret && !in_error {
            at.node_at
        } else {
            at.previous_node.unwrap_or(at.node_at)
        }
    }

    /// Context decided by the nearest meaningful ancestor
    fn syntactic_context(&self, tree: &SyntaxTree, anchor: NodeId) -> Option<Context> {
        for node in tree.ancestors(anchor) {
            let kind = self.classifier.classify(tree, node);
            if kind.is_expression_context() {
                return Some(Context::Columns(anchor));
            }
            if kind.is_table_source() {
                return Some(Context::Tables);
            }
            if matches!(
                kind,
                NodeKind::QueryBlock
                    | NodeKind::Subquery
                    | NodeKind::DerivedTable
                    | NodeKind::StatementBoundary
                    | NodeKind::SetOperation
                    | NodeKind::Statement
                    | NodeKind::RoutineReference
                    | NodeKind::Error
            ) {
                trace!(?kind, "Syntactic climb inconclusive");
                return None;
            }
        }
        None
    }

    /// Contexts reachable according to the oracle
    ///
    /// Ordered columns, tables, routines.
    fn oracle_contexts(
        &self,
        session: &ParseSession,
        at: &TokenOffset,
        oracle: &dyn RuleOracle,
    ) -> Vec<Context> {
        let tree = session.tree();
        let Some(index) = at
            .suggest_token_index
            .or_else(|| tree.token(at.node_at).map(|token| token.index))
        else {
            return Vec::new();
        };

        let kinds: Vec<NodeKind> = oracle
            .reachable_rules(session.tokens(), index)
            .into_iter()
            .map(|rule| self.classifier.classify_rule(rule))
            .collect();
        trace!(index, ?kinds, "Oracle rules");

        let mut contexts = Vec::new();
        if kinds.iter().any(|kind| kind.is_expression_context()) {
            contexts.push(Context::Columns(at.previous_node.unwrap_or(at.node_at)));
        }
        if kinds
            .iter()
            .any(|kind| kind.is_table_source() || *kind == NodeKind::TableReference)
        {
            contexts.push(Context::Tables);
        }
        if kinds.iter().any(|kind| kind.is_routine_reference()) {
            contexts.push(Context::Routines);
        }
        contexts
    }

    /// Qualifier of the dotted column reference around `node` (`o` in `o.Tot`)
    fn qualifier(&self, tree: &SyntaxTree, node: NodeId) -> Option<String> {
        let reference = self
            .classifier
            .enclosing(tree, node, NodeKind::ColumnReference)?;
        let parts = name_parts(self.classifier, tree, reference);
        if parts.len() < 2 {
            return None;
        }
        parts[parts.len() - 2].clone()
    }
}

/// Accumulates items across contexts, caching catalog lookups per database
struct Collector<'s> {
    session: &'s ParseSession,
    catalogs: &'s dyn CatalogProvider,
    connection: &'s ConnectionContext,
    default_database: &'s str,
    lookups: HashMap<String, CatalogLookup>,
    items: Vec<CompletionItem>,
    partial: bool,
}

impl Collector<'_> {
    fn lookup(&mut self, database: Option<&str>) -> CatalogLookup {
        let database = database.unwrap_or(self.default_database);
        let key = database.to_lowercase();
        if let Some(lookup) = self.lookups.get(&key) {
            return lookup.clone();
        }
        let lookup = self.catalogs.get_catalog(self.connection, database);
        if lookup.is_unavailable() {
            debug!(database, "Catalog unavailable, completion is partial");
            self.partial = true;
        }
        self.lookups.insert(key, lookup.clone());
        lookup
    }

    fn columns(&mut self, classifier: &NodeKindClassifier, node: NodeId, qualifier: Option<&str>) {
        let scope = self
            .session
            .collect_scope(classifier, node, self.default_database);
        self.partial |= scope.partial;

        for source in scope.iter() {
            if qualifier.is_some_and(|q| !source.answers_to(q)) {
                continue;
            }
            for (column, data_type) in self.source_columns(source) {
                self.items
                    .push(CompletionRenderer::column_item(&source.alias, &column, data_type));
            }
        }
    }

    /// Columns of one source with their type when known
    fn source_columns(&mut self, source: &TableAlias) -> Vec<(String, Option<String>)> {
        let mut columns = Vec::new();
        match source.kind {
            AliasKind::Table | AliasKind::ChangeTable => {
                let lookup = self.lookup(source.object_name.database.as_deref());
                if let Some(table) = lookup
                    .available()
                    .and_then(|catalog| catalog.find_table(&source.object_name))
                {
                    let primary_only = source.kind == AliasKind::ChangeTable;
                    columns.extend(
                        table
                            .columns
                            .iter()
                            .filter(|c| !primary_only || c.is_primary_key)
                            .map(|c| (c.name.clone(), Some(c.data_type.to_string()))),
                    );
                }
            }
            AliasKind::TableFunction => {
                let lookup = self.lookup(source.object_name.database.as_deref());
                if let Some(routine) = lookup
                    .available()
                    .and_then(|catalog| catalog.find_routine(&source.object_name))
                {
                    columns.extend(
                        routine
                            .result_columns
                            .iter()
                            .map(|c| (c.name.clone(), Some(c.data_type.to_string()))),
                    );
                }
            }
            AliasKind::TempTable | AliasKind::TableVariable => {
                if let Some(names) = self.session.registry().columns(&source.object_name.name) {
                    columns.extend(names.iter().map(|name| (name.clone(), None)));
                }
            }
            AliasKind::Subquery => {}
        }
        columns.extend(source.extended_columns.iter().map(|name| (name.clone(), None)));
        columns
    }

    fn tables(&mut self) {
        for temp in self.session.registry().iter() {
            self.items
                .push(CompletionRenderer::temp_item(&temp.name, temp.columns.len()));
        }
        if let Some(catalog) = self.lookup(None).available() {
            self.items
                .extend(catalog.tables.iter().map(CompletionRenderer::table_item));
        }
    }

    fn routines(&mut self) {
        if let Some(catalog) = self.lookup(None).available() {
            self.items
                .extend(catalog.routines.iter().map(CompletionRenderer::routine_item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsql_insight_semantic::Validator;
    use tsql_insight_test_utils::{FixtureGrammar, STANDARD_DATABASE, split_cursor, standard_catalog};

    fn session_at(marked: &str) -> (ParseSession, TokenOffset) {
        let (sql, offset) = split_cursor(marked).unwrap();
        let classifier = NodeKindClassifier::tsql();
        let catalogs = standard_catalog();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let validator = Validator::new(&classifier, catalogs.as_ref(), &connection);
        let session = ParseSession::build(&sql, &FixtureGrammar::new(), &validator).unwrap();
        let at = session.resolve_offset(offset).unwrap();
        (session, at)
    }

    fn context_of(marked: &str) -> Option<Context> {
        let (session, at) = session_at(marked);
        let classifier = NodeKindClassifier::tsql();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let engine = CompletionEngine::new(&classifier, &connection);
        let anchor = engine.anchor(session.tree(), &at);
        engine.syntactic_context(session.tree(), anchor)
    }

    #[test]
    fn test_syntactic_contexts() {
        assert!(matches!(
            context_of("SELECT * FROM dbo.Orders o WHERE o.|"),
            Some(Context::Columns(_))
        ));
        assert!(matches!(
            context_of("SELECT * FROM dbo.Orders o WHERE |"),
            Some(Context::Columns(_))
        ));
        assert_eq!(context_of("SELECT * FROM dbo.Ord|"), Some(Context::Tables));
        assert_eq!(context_of("UPDATE dbo.Ord| SET x = 1"), Some(Context::Tables));
    }

    #[test]
    fn test_inconclusive_positions_defer_to_oracle() {
        assert_eq!(context_of("SELECT * FROM |"), None);
        assert_eq!(context_of("SELECT | FROM dbo.Orders o"), None);
        assert_eq!(context_of("EXEC |"), None);
        assert_eq!(context_of("EXEC dbo.Get|"), None);
    }

    #[test]
    fn test_qualifier_of_dotted_reference() {
        let (session, at) = session_at("SELECT * FROM dbo.Orders o WHERE o.|");
        let classifier = NodeKindClassifier::tsql();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let engine = CompletionEngine::new(&classifier, &connection);
        assert_eq!(
            engine.qualifier(session.tree(), at.node_at).as_deref(),
            Some("o")
        );

        let (session, at) = session_at("SELECT * FROM dbo.Orders o WHERE Tot|");
        assert_eq!(engine.qualifier(session.tree(), at.node_at), None);
    }
}
