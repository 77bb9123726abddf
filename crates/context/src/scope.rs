// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scope Collection
//!
//! Computes the table-like sources visible at a tree position.
//!
//! The collector climbs from the position toward the root. Each ancestor is
//! classified and handled by kind:
//!
//! - statement or set-operation boundary: stop
//! - query block (SELECT body, UPDATE, DELETE): stop if a subquery was
//!   crossed without a correlation bridge, else add the block's sources
//! - join list: add the sources up to and including the branch the climb
//!   came from; leaving an APPLY branch is a correlation bridge
//! - EXISTS predicate: correlation bridge
//! - subquery or derived table: outer levels become invisible
//!
//! The ascent state is a plain [`ScopeState`] value returned by every step.

use tracing::{debug, trace};
use tsql_insight_grammar::{NodeId, SyntaxTree};
use tsql_insight_ir::ObjectName;

use crate::alias::{AliasKind, CHANGE_TABLE_COLUMNS, TableAlias};
use crate::classify::{NodeKind, NodeKindClassifier};
use crate::cst_utils;

/// Where the climb currently is relative to subquery boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeState {
    /// No subquery crossed yet
    #[default]
    Root,
    /// Crossed a subquery boundary; outer query blocks are invisible
    InSubquery,
    /// Crossed a subquery through an APPLY or EXISTS bridge
    InCorrelatedBridge,
}

/// Sources visible at a position
///
/// Behaves as a set keyed by [`TableAlias`] identity while keeping the order
/// in which sources were first seen.
#[derive(Debug, Clone, Default)]
pub struct ScopeResult {
    aliases: Vec<TableAlias>,
    /// A source could not be classified because it contains an error node
    pub partial: bool,
}

impl ScopeResult {
    /// Add a source; returns false when an identical one is already present
    pub fn insert(&mut self, alias: TableAlias) -> bool {
        if self.aliases.contains(&alias) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    pub fn aliases(&self) -> &[TableAlias] {
        &self.aliases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableAlias> {
        self.aliases.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn contains(&self, alias: &TableAlias) -> bool {
        self.aliases.contains(alias)
    }

    /// Source a column qualifier refers to
    pub fn find(&self, qualifier: &str) -> Option<&TableAlias> {
        self.aliases.iter().find(|a| a.answers_to(qualifier))
    }

    pub fn into_aliases(self) -> Vec<TableAlias> {
        self.aliases
    }
}

impl<'a> IntoIterator for &'a ScopeResult {
    type Item = &'a TableAlias;
    type IntoIter = std::slice::Iter<'a, TableAlias>;

    fn into_iter(self) -> Self::IntoIter {
        self.aliases.iter()
    }
}

/// Outcome of visiting one ancestor
enum Ascent {
    Continue(ScopeState),
    Stop,
}

/// Collects the sources visible at a tree position
#[derive(Debug, Clone, Copy)]
pub struct ScopeCollector<'c> {
    classifier: &'c NodeKindClassifier,
}

impl<'c> ScopeCollector<'c> {
    pub fn new(classifier: &'c NodeKindClassifier) -> Self {
        Self { classifier }
    }

    /// Collect the sources visible at `position`
    ///
    /// # Arguments
    ///
    /// * `tree` - The (possibly error-recovered) syntax tree
    /// * `position` - Node the climb starts from
    /// * `default_database` - Database filled into names that omit one
    pub fn collect(&self, tree: &SyntaxTree, position: NodeId, default_database: &str) -> ScopeResult {
        let mut result = ScopeResult::default();
        let mut state = ScopeState::Root;
        let mut came_from = None;

        for node in tree.ancestors(position) {
            let step = Step {
                tree,
                node,
                came_from,
                position,
                default_database,
            };
            match self.visit(&step, state, &mut result) {
                Ascent::Continue(next) => state = next,
                Ascent::Stop => break,
            }
            came_from = Some(node);
        }

        debug!(
            sources = result.len(),
            partial = result.partial,
            "Collected scope"
        );
        result
    }

    /// All sources of a query block's FROM clause (or its DML target)
    pub fn block_sources(
        &self,
        tree: &SyntaxTree,
        block: NodeId,
        default_database: &str,
    ) -> ScopeResult {
        let mut result = ScopeResult::default();
        self.add_block_sources(tree, block, None, default_database, &mut result);
        result
    }

    fn visit(&self, step: &Step<'_>, state: ScopeState, result: &mut ScopeResult) -> Ascent {
        let kind = self.classifier.classify(step.tree, step.node);
        match kind {
            kind if kind.is_scope_boundary() => {
                trace!(?kind, "Scope boundary reached");
                Ascent::Stop
            }
            NodeKind::QueryBlock => {
                if state == ScopeState::InSubquery {
                    trace!("Outer query block hidden by subquery boundary");
                    return Ascent::Stop;
                }
                self.add_block_sources(
                    step.tree,
                    step.node,
                    Some(step.position),
                    step.default_database,
                    result,
                );
                Ascent::Continue(state)
            }
            NodeKind::JoinList => {
                let leaving_apply = step
                    .came_from
                    .is_some_and(|branch| self.classifier.is(step.tree, branch, NodeKind::ApplyBranch));
                let state = if leaving_apply && state == ScopeState::InSubquery {
                    trace!("Crossing APPLY correlation bridge");
                    ScopeState::InCorrelatedBridge
                } else {
                    state
                };
                if state != ScopeState::InSubquery {
                    self.add_join_list(
                        step.tree,
                        step.node,
                        step.came_from,
                        step.default_database,
                        result,
                    );
                }
                Ascent::Continue(state)
            }
            NodeKind::ExistsPredicate if state == ScopeState::InSubquery => {
                trace!("Crossing EXISTS correlation bridge");
                Ascent::Continue(ScopeState::InCorrelatedBridge)
            }
            kind if kind.is_subquery() => Ascent::Continue(ScopeState::InSubquery),
            _ => Ascent::Continue(state),
        }
    }

    /// Sources of a query block. When the climb already passed through the
    /// block's join list, that list has been handled there.
    fn add_block_sources(
        &self,
        tree: &SyntaxTree,
        block: NodeId,
        position: Option<NodeId>,
        default_database: &str,
        result: &mut ScopeResult,
    ) {
        let classifier = self.classifier;
        if let Some(from) = classifier.child_of_kind(tree, block, NodeKind::FromClause) {
            let Some(list) = classifier.child_of_kind(tree, from, NodeKind::JoinList) else {
                return;
            };
            let visited = position.is_some_and(|p| tree.ancestors(p).any(|a| a == list));
            if !visited {
                self.add_join_list(tree, list, None, default_database, result);
            }
            return;
        }

        let target = classifier
            .child_of_kind(tree, block, NodeKind::DmlTarget)
            .and_then(|target| tree.children(target).first().copied());
        if let Some(target) = target {
            if let Some(alias) = self.source(tree, target, String::new(), default_database) {
                result.insert(alias);
            }
        }
    }

    /// Sources of a join list, stopping after `upto` when given
    fn add_join_list(
        &self,
        tree: &SyntaxTree,
        list: NodeId,
        upto: Option<NodeId>,
        default_database: &str,
        result: &mut ScopeResult,
    ) {
        for &child in tree.children(list) {
            let item = match self.classifier.classify(tree, child) {
                NodeKind::TableSourceItem => Some(child),
                NodeKind::JoinBranch | NodeKind::ApplyBranch => {
                    self.classifier.child_of_kind(tree, child, NodeKind::TableSourceItem)
                }
                _ => None,
            };
            if let Some(item) = item {
                self.add_source_item(tree, item, default_database, result);
            }
            if upto == Some(child) {
                break;
            }
        }
    }

    fn add_source_item(
        &self,
        tree: &SyntaxTree,
        item: NodeId,
        default_database: &str,
        result: &mut ScopeResult,
    ) {
        if let Some(nested) = self.classifier.child_of_kind(tree, item, NodeKind::JoinList) {
            self.add_join_list(tree, nested, None, default_database, result);
            return;
        }

        let alias = cst_utils::table_alias_of(self.classifier, tree, item).unwrap_or_default();
        let resolved = tree
            .children(item)
            .iter()
            .find_map(|&child| self.source(tree, child, alias.clone(), default_database));

        match resolved {
            Some(source) => {
                result.insert(source);
            }
            None if tree.contains_error(item) => {
                trace!(span = ?tree.span(item), "Unclassifiable source item");
                result.partial = true;
            }
            None => {}
        }
    }

    /// Classify one source node into a [`TableAlias`]
    fn source(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
        alias: String,
        default_database: &str,
    ) -> Option<TableAlias> {
        let classifier = self.classifier;
        match classifier.classify(tree, node) {
            NodeKind::TableReference => {
                let name = cst_utils::qualified_name(classifier, tree, node)?.object;
                Some(if name.is_temp() {
                    TableAlias::new(alias, name.unqualified(), AliasKind::TempTable)
                } else {
                    TableAlias::new(alias, name.or_database(default_database), AliasKind::Table)
                })
            }
            NodeKind::TableVariable => {
                let name = cst_utils::identifier_text(tree, node);
                Some(TableAlias::new(alias, ObjectName::new(name), AliasKind::TableVariable))
            }
            NodeKind::FunctionCall => {
                let routine = classifier.child_of_kind(tree, node, NodeKind::RoutineReference)?;
                let name = cst_utils::qualified_name(classifier, tree, routine)?.object;
                Some(TableAlias::new(
                    alias,
                    name.or_database(default_database),
                    AliasKind::TableFunction,
                ))
            }
            NodeKind::ChangeTable => {
                let table = classifier.child_of_kind(tree, node, NodeKind::TableReference)?;
                let name = cst_utils::qualified_name(classifier, tree, table)?.object;
                let columns = CHANGE_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
                Some(
                    TableAlias::new(alias, name.or_database(default_database), AliasKind::ChangeTable)
                        .with_extended_columns(columns),
                )
            }
            NodeKind::DerivedTable => self.derived_table(tree, node),
            _ => None,
        }
    }

    fn derived_table(&self, tree: &SyntaxTree, node: NodeId) -> Option<TableAlias> {
        let classifier = self.classifier;
        let alias = cst_utils::table_alias_of(classifier, tree, node)?;
        let columns = match classifier.child_of_kind(tree, node, NodeKind::ColumnList) {
            Some(list) => cst_utils::column_list(classifier, tree, list),
            None => classifier
                .child_of_kind(tree, node, NodeKind::Subquery)
                .and_then(|subquery| cst_utils::first_query_block(classifier, tree, subquery))
                .map(|block| cst_utils::projection_names(classifier, tree, block))
                .unwrap_or_default(),
        };
        let name = ObjectName::new(alias.clone());
        Some(TableAlias::new(alias, name, AliasKind::Subquery).with_extended_columns(columns))
    }
}

/// One level of the climb
struct Step<'t> {
    tree: &'t SyntaxTree,
    node: NodeId,
    came_from: Option<NodeId>,
    position: NodeId,
    default_database: &'t str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsql_insight_grammar::rules::tsql;
    use tsql_insight_test_utils::parse;

    fn first(tree: &SyntaxTree, rule: tsql_insight_grammar::RuleId) -> NodeId {
        tree.descendants(tree.root())
            .find(|&n| tree.is_rule(n, rule))
            .unwrap()
    }

    #[test]
    fn test_scope_result_is_ordered_set() {
        let mut result = ScopeResult::default();
        let o = TableAlias::new("o", ObjectName::new("Orders"), AliasKind::Table);
        assert!(result.insert(o.clone()));
        assert!(!result.insert(o));
        assert!(result.insert(TableAlias::new("c", ObjectName::new("Customers"), AliasKind::Table)));
        let names: Vec<&str> = result.iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(names, vec!["o", "c"]);
        assert!(result.find("C").is_some());
    }

    #[test]
    fn test_block_sources_of_delete_without_from() {
        let classifier = NodeKindClassifier::tsql();
        let tree = parse("DELETE FROM #recent WHERE Total IS NULL").tree.unwrap();
        let block = first(&tree, tsql::DELETE_STATEMENT);
        let result = ScopeCollector::new(&classifier).block_sources(&tree, block, "Sales");
        assert_eq!(result.len(), 1);
        let target = &result.aliases()[0];
        assert_eq!(target.kind, AliasKind::TempTable);
        assert_eq!(target.object_name, ObjectName::new("#recent"));
        assert!(!target.has_alias());
    }

    #[test]
    fn test_default_database_and_temp_names() {
        let classifier = NodeKindClassifier::tsql();
        let tree = parse("SELECT * FROM dbo.Orders o, Hr.dbo.Employees, tempdb.dbo.#t t")
            .tree
            .unwrap();
        let block = first(&tree, tsql::QUERY_SPECIFICATION);
        let result = ScopeCollector::new(&classifier).block_sources(&tree, block, "Sales");
        let aliases = result.aliases();
        assert_eq!(aliases.len(), 3);
        assert_eq!(aliases[0].object_name.database.as_deref(), Some("Sales"));
        assert_eq!(aliases[1].object_name.database.as_deref(), Some("Hr"));
        assert_eq!(aliases[2].kind, AliasKind::TempTable);
        assert_eq!(aliases[2].object_name.database, None);
        assert_eq!(aliases[2].object_name.schema, None);
    }
}
