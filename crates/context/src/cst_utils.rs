// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # CST Utilities
//!
//! Helpers for walking the concrete syntax tree produced by the grammar.
//!
//! These work on any tree built through `TreeBuilder`; rule-specific meaning
//! always goes through [`NodeKindClassifier`].

use tsql_insight_grammar::{NodeId, SyntaxTree};
use tsql_insight_ir::QualifiedName;

use crate::classify::{NodeKind, NodeKindClassifier};

/// Find the innermost node whose span contains `offset`
///
/// Descends from the root, entering only children whose half-open span
/// contains the offset, and returns the last node that still does.
///
/// # Arguments
///
/// * `tree` - The syntax tree
/// * `offset` - Character offset in the document
///
/// # Returns
///
/// `None` when the offset lies outside the root span
pub fn innermost_node_at(tree: &SyntaxTree, offset: usize) -> Option<NodeId> {
    let root = tree.root();
    if !tree.span(root).contains(&offset) {
        return None;
    }

    let mut current = root;
    'descend: loop {
        for &child in tree.children(current) {
            if tree.span(child).contains(&offset) {
                current = child;
                continue 'descend;
            }
        }
        return Some(current);
    }
}

/// Strip identifier quoting: `[a]]b]` becomes `a]b`, `"x"` becomes `x`
///
/// # Examples
///
/// ```
/// use tsql_insight_context::cst_utils::unquote_identifier;
///
/// assert_eq!(unquote_identifier("[Order Details]"), "Order Details");
/// assert_eq!(unquote_identifier("\"col\""), "col");
/// assert_eq!(unquote_identifier("plain"), "plain");
/// ```
pub fn unquote_identifier(text: &str) -> String {
    let quoted = |open: char, close: char| {
        text.len() >= 2 && text.starts_with(open) && text.ends_with(close)
    };
    if quoted('[', ']') {
        text[1..text.len() - 1].replace("]]", "]")
    } else if quoted('"', '"') {
        text[1..text.len() - 1].replace("\"\"", "\"")
    } else if quoted('\'', '\'') {
        text[1..text.len() - 1].replace("''", "'")
    } else {
        text.to_string()
    }
}

/// Unquoted text of an identifier-like node
pub fn identifier_text(tree: &SyntaxTree, node: NodeId) -> String {
    unquote_identifier(&tree.text(node))
}

/// Dotted name parts of a name node (`db..t` gives `[db, None, t]`)
///
/// A trailing dot yields a trailing `None`, which marks the name as
/// incomplete.
pub fn name_parts(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    node: NodeId,
) -> Vec<Option<String>> {
    let mut parts = Vec::new();
    let mut current = None;
    for &child in tree.children(node) {
        match classifier.classify(tree, child) {
            NodeKind::Identifier => current = Some(identifier_text(tree, child)),
            NodeKind::Terminal if tree.text(child) == "." => parts.push(current.take()),
            _ => {}
        }
    }
    parts.push(current);
    parts
}

/// Qualified name of a table, routine or column reference node
pub fn qualified_name(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    node: NodeId,
) -> Option<QualifiedName> {
    QualifiedName::from_parts(&name_parts(classifier, tree, node))
}

/// Alias declared by a table source item or derived table, if any
pub fn table_alias_of(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    node: NodeId,
) -> Option<String> {
    let alias = classifier.child_of_kind(tree, node, NodeKind::TableAlias)?;
    let id = classifier.child_of_kind(tree, alias, NodeKind::Identifier)?;
    Some(identifier_text(tree, id))
}

/// Identifiers listed directly under a column list node
pub fn column_list(classifier: &NodeKindClassifier, tree: &SyntaxTree, node: NodeId) -> Vec<String> {
    tree.children(node)
        .iter()
        .filter(|&&child| classifier.is(tree, child, NodeKind::Identifier))
        .map(|&child| identifier_text(tree, child))
        .collect()
}

/// Output column names of a query block's select list
///
/// Uses explicit aliases, else the trailing identifier of a bare column
/// reference. Other expressions and `*` contribute nothing.
pub fn projection_names(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    query_block: NodeId,
) -> Vec<String> {
    let Some(list) = classifier.child_of_kind(tree, query_block, NodeKind::SelectList) else {
        return Vec::new();
    };

    tree.children(list)
        .iter()
        .filter(|&&item| classifier.is(tree, item, NodeKind::SelectItem))
        .filter_map(|&item| projection_name(classifier, tree, item))
        .collect()
}

fn projection_name(classifier: &NodeKindClassifier, tree: &SyntaxTree, item: NodeId) -> Option<String> {
    if let Some(alias) = classifier.child_of_kind(tree, item, NodeKind::ColumnAlias) {
        let id = classifier.child_of_kind(tree, alias, NodeKind::Identifier)?;
        return Some(identifier_text(tree, id));
    }

    let expression = classifier.child_of_kind(tree, item, NodeKind::Expression)?;
    match tree.children(expression) {
        [single] if classifier.is(tree, *single, NodeKind::ColumnReference) => {
            name_parts(classifier, tree, *single).pop().flatten()
        }
        _ => None,
    }
}

/// First query block of a query: the body itself, or the left-most branch of
/// a set operation
pub fn first_query_block(
    classifier: &NodeKindClassifier,
    tree: &SyntaxTree,
    node: NodeId,
) -> Option<NodeId> {
    tree.descendants(node)
        .find(|&n| classifier.is(tree, n, NodeKind::QueryBlock))
}

/// Whether the two nodes have the same default-channel text, ignoring case
pub fn same_text(tree: &SyntaxTree, a: NodeId, b: NodeId) -> bool {
    tree.text(a).to_lowercase() == tree.text(b).to_lowercase()
}
