// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Object reference under a caret, shared by tooltips and link actions

use std::ops::Range;

use tracing::trace;
use tsql_insight_context::{NodeKind, NodeKindClassifier, innermost_node_at, qualified_name};
use tsql_insight_grammar::{NodeId, SyntaxTree};
use tsql_insight_ir::{ObjectKind, QualifiedName};

/// A table or routine name found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    /// Kind implied by the syntax; the catalog may refine table to view
    pub kind: ObjectKind,
    pub name: QualifiedName,
    /// Span of the whole dotted name
    pub span: Range<usize>,
}

/// Find the table or routine reference enclosing `offset`
///
/// Starts at the innermost node containing the offset and climbs until the
/// first table reference or routine reference. Gives up at a statement
/// boundary or when the name is incomplete (`dbo.`).
pub fn reference_at(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    offset: usize,
) -> Option<ObjectReference> {
    let start = innermost_node_at(tree, offset)?;

    for node in tree.ancestors(start) {
        let kind = match classifier.classify(tree, node) {
            NodeKind::TableReference => ObjectKind::Table,
            NodeKind::RoutineReference => routine_kind(classifier, tree, node),
            NodeKind::StatementBoundary => break,
            _ => continue,
        };
        let name = qualified_name(classifier, tree, node)?;
        trace!(name = %name.object, kind = kind.as_str(), "Reference under caret");
        return Some(ObjectReference {
            kind,
            name,
            span: tree.span(node),
        });
    }
    None
}

/// Function when called inside an expression, procedure otherwise
fn routine_kind(classifier: &NodeKindClassifier, tree: &SyntaxTree, node: NodeId) -> ObjectKind {
    match tree.parent(node).map(|parent| classifier.classify(tree, parent)) {
        Some(NodeKind::FunctionCall) => ObjectKind::Function,
        _ => ObjectKind::Procedure,
    }
}
