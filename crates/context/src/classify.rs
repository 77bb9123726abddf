// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Node kind classification
//!
//! Every analysis in this crate asks one question about a tree node: what
//! does it mean? [`NodeKindClassifier`] answers it from a single table that
//! maps grammar rule ids to a closed [`NodeKind`] enum, so no component
//! inspects raw rule ids on its own.
//!
//! ## Example
//!
//! ```rust
//! use tsql_insight_context::{NodeKind, NodeKindClassifier};
//! use tsql_insight_grammar::rules::tsql;
//!
//! let classifier = NodeKindClassifier::tsql();
//! assert_eq!(classifier.classify_rule(tsql::TABLE_SOURCES), NodeKind::JoinList);
//! assert!(classifier.classify_rule(tsql::SQL_CLAUSE).is_scope_boundary());
//! ```

use std::collections::HashMap;

use tsql_insight_grammar::rules::tsql;
use tsql_insight_grammar::{NodeId, NodeType, RuleId, SyntaxTree};

/// Semantic kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Batch or single statement; scopes never cross it
    StatementBoundary,
    /// UNION / EXCEPT / INTERSECT
    SetOperation,
    /// Statement wrapper that carries no scope of its own (SELECT, INSERT, EXEC)
    Statement,
    /// SELECT body, UPDATE or DELETE: owns a FROM clause
    QueryBlock,
    SelectList,
    SelectItem,
    ColumnAlias,
    IntoClause,
    FromClause,
    /// Flat list of table sources and join branches
    JoinList,
    JoinBranch,
    /// CROSS / OUTER APPLY branch
    ApplyBranch,
    TableSourceItem,
    /// Name of a persistent or temp table
    TableReference,
    TableAlias,
    TableVariable,
    DerivedTable,
    Subquery,
    ChangeTable,
    FunctionCall,
    /// Name of a procedure or function
    RoutineReference,
    /// WHERE / ON / HAVING condition
    Condition,
    /// Binary comparison or IS / IN / LIKE / BETWEEN test
    Predicate,
    ExistsPredicate,
    Expression,
    ColumnReference,
    /// Target object of UPDATE / DELETE / INSERT
    DmlTarget,
    CreateTable,
    DeclareVariable,
    TableTypeDefinition,
    ColumnDefinition,
    ColumnList,
    Identifier,
    Terminal,
    EndOfInput,
    Error,
    Other,
}

impl NodeKind {
    /// Whether column names are expected here
    pub fn is_expression_context(self) -> bool {
        matches!(
            self,
            NodeKind::Expression
                | NodeKind::Condition
                | NodeKind::Predicate
                | NodeKind::ColumnReference
        )
    }

    /// Whether scope collection stops at this node
    pub fn is_scope_boundary(self) -> bool {
        matches!(self, NodeKind::StatementBoundary | NodeKind::SetOperation)
    }

    /// Whether a table name is expected here
    pub fn is_table_source(self) -> bool {
        matches!(self, NodeKind::TableSourceItem | NodeKind::DmlTarget)
    }

    /// Whether the node names a procedure or function
    pub fn is_routine_reference(self) -> bool {
        self == NodeKind::RoutineReference
    }

    /// Whether the node enters a nested query
    pub fn is_subquery(self) -> bool {
        matches!(self, NodeKind::Subquery | NodeKind::DerivedTable)
    }
}

/// Table-driven mapping from rule ids to [`NodeKind`]
#[derive(Debug, Clone, Default)]
pub struct NodeKindClassifier {
    table: HashMap<RuleId, NodeKind>,
}

impl NodeKindClassifier {
    /// Classifier for an arbitrary grammar
    pub fn from_table(entries: impl IntoIterator<Item = (RuleId, NodeKind)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Classifier for the T-SQL rule table
    pub fn tsql() -> Self {
        Self::from_table([
            (tsql::BATCH, NodeKind::StatementBoundary),
            (tsql::SQL_CLAUSE, NodeKind::StatementBoundary),
            (tsql::SELECT_STATEMENT, NodeKind::Statement),
            (tsql::INSERT_STATEMENT, NodeKind::Statement),
            (tsql::EXECUTE_STATEMENT, NodeKind::Statement),
            (tsql::QUERY_EXPRESSION, NodeKind::SetOperation),
            (tsql::QUERY_SPECIFICATION, NodeKind::QueryBlock),
            (tsql::UPDATE_STATEMENT, NodeKind::QueryBlock),
            (tsql::DELETE_STATEMENT, NodeKind::QueryBlock),
            (tsql::SELECT_LIST, NodeKind::SelectList),
            (tsql::SELECT_LIST_ELEM, NodeKind::SelectItem),
            (tsql::COLUMN_ALIAS, NodeKind::ColumnAlias),
            (tsql::INTO_CLAUSE, NodeKind::IntoClause),
            (tsql::FROM_CLAUSE, NodeKind::FromClause),
            (tsql::TABLE_SOURCES, NodeKind::JoinList),
            (tsql::JOIN_PART, NodeKind::JoinBranch),
            (tsql::APPLY_PART, NodeKind::ApplyBranch),
            (tsql::TABLE_SOURCE_ITEM, NodeKind::TableSourceItem),
            (tsql::FULL_TABLE_NAME, NodeKind::TableReference),
            (tsql::TABLE_ALIAS, NodeKind::TableAlias),
            (tsql::TABLE_VARIABLE, NodeKind::TableVariable),
            (tsql::DERIVED_TABLE, NodeKind::DerivedTable),
            (tsql::SUBQUERY, NodeKind::Subquery),
            (tsql::CHANGE_TABLE, NodeKind::ChangeTable),
            (tsql::FUNCTION_CALL, NodeKind::FunctionCall),
            (tsql::FUNC_PROC_NAME, NodeKind::RoutineReference),
            (tsql::SEARCH_CONDITION, NodeKind::Condition),
            (tsql::WHERE_CLAUSE, NodeKind::Condition),
            (tsql::PREDICATE, NodeKind::Predicate),
            (tsql::EXISTS_PREDICATE, NodeKind::ExistsPredicate),
            (tsql::EXPRESSION, NodeKind::Expression),
            (tsql::UPDATE_ELEM, NodeKind::Expression),
            (tsql::GROUP_BY_CLAUSE, NodeKind::Expression),
            (tsql::ORDER_BY_CLAUSE, NodeKind::Expression),
            (tsql::FULL_COLUMN_NAME, NodeKind::ColumnReference),
            (tsql::DML_TARGET, NodeKind::DmlTarget),
            (tsql::CREATE_TABLE, NodeKind::CreateTable),
            (tsql::DECLARE_STATEMENT, NodeKind::DeclareVariable),
            (tsql::TABLE_TYPE_DEFINITION, NodeKind::TableTypeDefinition),
            (tsql::COLUMN_DEFINITION, NodeKind::ColumnDefinition),
            (tsql::COLUMN_NAME_LIST, NodeKind::ColumnList),
            (tsql::ID, NodeKind::Identifier),
        ])
    }

    /// Kind of a grammar rule
    pub fn classify_rule(&self, rule: RuleId) -> NodeKind {
        self.table.get(&rule).copied().unwrap_or(NodeKind::Other)
    }

    /// Kind of a tree node
    pub fn classify(&self, tree: &SyntaxTree, node: NodeId) -> NodeKind {
        match tree.node_type(node) {
            NodeType::Rule(rule) => self.classify_rule(rule),
            NodeType::Error => NodeKind::Error,
            NodeType::Terminal(_) => match tree.token(node) {
                Some(token) if token.is_eof() => NodeKind::EndOfInput,
                _ => NodeKind::Terminal,
            },
        }
    }

    /// Whether `node` has the given kind
    pub fn is(&self, tree: &SyntaxTree, node: NodeId, kind: NodeKind) -> bool {
        self.classify(tree, node) == kind
    }

    /// First child of `node` with the given kind
    pub fn child_of_kind(&self, tree: &SyntaxTree, node: NodeId, kind: NodeKind) -> Option<NodeId> {
        tree.children(node)
            .iter()
            .copied()
            .find(|&child| self.is(tree, child, kind))
    }

    /// Nearest ancestor of `node` (itself included) with the given kind,
    /// without crossing a statement boundary
    pub fn enclosing(&self, tree: &SyntaxTree, node: NodeId, kind: NodeKind) -> Option<NodeId> {
        for ancestor in tree.ancestors(node) {
            let ancestor_kind = self.classify(tree, ancestor);
            if ancestor_kind == kind {
                return Some(ancestor);
            }
            if ancestor_kind == NodeKind::StatementBoundary {
                return None;
            }
        }
        None
    }
}
