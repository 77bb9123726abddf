// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax tree
//!
//! A grammar-neutral concrete syntax tree stored as an arena. Nodes are rule
//! nodes (a [`RuleId`] with ordered children), terminal nodes (one
//! default-channel token) or error nodes produced by error recovery.
//!
//! Every node caches the first and last token it covers, so spans and text
//! extraction never walk the subtree. Parent links let callers climb from a
//! position toward the root.
//!
//! Trees are built bottom-up with [`TreeBuilder`]:
//!
//! ```rust
//! use tsql_insight_grammar::{Token, TokenStream, TreeBuilder, rules::tsql};
//!
//! let tokens = TokenStream::new(vec![Token::new(0, 0, "x"), Token::eof(1, 1)]);
//! let mut builder = TreeBuilder::new();
//! builder.start_node(tsql::BATCH);
//! builder.start_node(tsql::EXPRESSION);
//! builder.token(0);
//! builder.finish_node();
//! builder.token(1);
//! builder.finish_node();
//! let tree = builder.finish(tokens).unwrap();
//!
//! assert_eq!(tree.children(tree.root()).len(), 2);
//! ```

use std::fmt::Write;
use std::ops::Range;

use crate::error::{GrammarError, GrammarResult};
use crate::rules::RuleId;
use crate::token::{Token, TokenStream};

/// Handle of a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Non-terminal
    Rule(RuleId),
    /// Terminal wrapping the token with this index
    Terminal(usize),
    /// Error-recovery node
    Error,
}

#[derive(Debug, Clone)]
struct NodeData {
    node_type: NodeType,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    first_token: usize,
    last_token: usize,
}

/// Immutable syntax tree with its token stream
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    tokens: TokenStream,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The full token stream, including hidden-channel tokens
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    pub fn node_type(&self, node: NodeId) -> NodeType {
        self.data(node).node_type
    }

    /// Rule id of a rule node
    pub fn rule(&self, node: NodeId) -> Option<RuleId> {
        match self.data(node).node_type {
            NodeType::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// Whether `node` is a rule node of the given rule
    pub fn is_rule(&self, node: NodeId, rule: RuleId) -> bool {
        self.rule(node) == Some(rule)
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        matches!(self.data(node).node_type, NodeType::Terminal(_))
    }

    pub fn is_error(&self, node: NodeId) -> bool {
        self.data(node).node_type == NodeType::Error
    }

    /// Token wrapped by a terminal node
    pub fn token(&self, node: NodeId) -> Option<&Token> {
        match self.data(node).node_type {
            NodeType::Terminal(index) => self.tokens.get(index),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.data(node).children
    }

    /// First child that is a rule node of `rule`
    pub fn child_by_rule(&self, node: NodeId, rule: RuleId) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&child| self.is_rule(child, rule))
    }

    /// All children that are rule nodes of `rule`
    pub fn children_by_rule(&self, node: NodeId, rule: RuleId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(move |&child| self.is_rule(child, rule))
    }

    /// Whether `node` has a terminal child whose text equals `keyword`
    /// (case-insensitive)
    pub fn has_keyword(&self, node: NodeId, keyword: &str) -> bool {
        self.children(node).iter().any(|&child| {
            self.token(child)
                .is_some_and(|t| t.text.eq_ignore_ascii_case(keyword))
        })
    }

    /// Index of `child` among its parent's children
    pub fn child_position(&self, child: NodeId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.children(parent).iter().position(|&c| c == child)
    }

    /// First covered default-channel token
    pub fn first_token(&self, node: NodeId) -> &Token {
        &self.tokens.as_slice()[self.data(node).first_token]
    }

    /// Last covered default-channel token
    pub fn last_token(&self, node: NodeId) -> &Token {
        &self.tokens.as_slice()[self.data(node).last_token]
    }

    /// Half-open character span `[first covered offset, last covered offset)`
    pub fn span(&self, node: NodeId) -> Range<usize> {
        self.first_token(node).start..self.last_token(node).end
    }

    /// The node itself followed by its ancestors up to the root
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |&n| self.parent(n))
    }

    /// Pre-order traversal of the subtree rooted at `node`
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![node],
        }
    }

    /// Terminal nodes of the subtree, in document order
    pub fn terminals(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(node).filter(|&n| self.is_terminal(n))
    }

    /// Whether the subtree contains an error node
    pub fn contains_error(&self, node: NodeId) -> bool {
        self.descendants(node).any(|n| self.is_error(n))
    }

    /// Concatenated default-channel text of the subtree
    ///
    /// Whitespace and comments are dropped, so `a . x` and `a.x` compare
    /// equal.
    pub fn text(&self, node: NodeId) -> String {
        self.terminals(node)
            .filter_map(|n| self.token(n))
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Exact source text of the subtree, hidden tokens included
    pub fn source_text(&self, node: NodeId) -> String {
        let data = self.data(node);
        self.tokens.as_slice()[data.first_token..=data.last_token]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    /// S-expression dump of the subtree, mostly for tests and tracing
    pub fn dump(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, &mut out);
        out
    }

    fn dump_into(&self, node: NodeId, out: &mut String) {
        match self.node_type(node) {
            NodeType::Terminal(_) => {
                if let Some(token) = self.token(node) {
                    if token.is_eof() {
                        out.push_str("<EOF>");
                    } else {
                        let _ = write!(out, "{:?}", token.text);
                    }
                }
            }
            node_type => {
                match node_type {
                    NodeType::Rule(rule) => {
                        let _ = write!(out, "({}", rule);
                    }
                    _ => out.push_str("(ERROR"),
                }
                for &child in self.children(node) {
                    out.push(' ');
                    self.dump_into(child, out);
                }
                out.push(')');
            }
        }
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Position in the builder's child list, see [`TreeBuilder::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Bottom-up builder for [`SyntaxTree`]
///
/// Rule and error nodes that end up covering no token are dropped, so every
/// materialised node has a non-empty token range.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<(NodeType, usize)>,
    pending: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a rule node
    pub fn start_node(&mut self, rule: RuleId) {
        self.open.push((NodeType::Rule(rule), self.pending.len()));
    }

    /// Open an error node
    pub fn start_error(&mut self) {
        self.open.push((NodeType::Error, self.pending.len()));
    }

    /// Remember the current position so a node can later be wrapped around
    /// everything emitted after it
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pending.len())
    }

    /// Open a rule node whose first child is the element at `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, rule: RuleId) {
        let floor = self.open.last().map(|&(_, start)| start).unwrap_or(0);
        debug_assert!(checkpoint.0 >= floor && checkpoint.0 <= self.pending.len());
        self.open
            .push((NodeType::Rule(rule), checkpoint.0.max(floor).min(self.pending.len())));
    }

    /// Add a terminal for the token with the given index
    pub fn token(&mut self, index: usize) {
        let id = self.alloc(NodeData {
            node_type: NodeType::Terminal(index),
            parent: None,
            children: Vec::new(),
            first_token: index,
            last_token: index,
        });
        self.pending.push(id);
    }

    /// Close the innermost open node
    pub fn finish_node(&mut self) {
        let Some((node_type, start)) = self.open.pop() else {
            debug_assert!(false, "finish_node without start_node");
            return;
        };
        let children: Vec<NodeId> = self.pending.drain(start..).collect();
        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            return;
        };
        let first_token = self.nodes[first.index()].first_token;
        let last_token = self.nodes[last.index()].last_token;
        let id = self.alloc(NodeData {
            node_type,
            parent: None,
            children,
            first_token,
            last_token,
        });
        for child in self.nodes[id.index()].children.clone() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.pending.push(id);
    }

    /// Number of currently open nodes
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Finish building and attach the token stream
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnbalancedBuilder`] if nodes are still open,
    /// [`GrammarError::EmptyTree`] if nothing was emitted, and
    /// [`GrammarError::MultipleRoots`] if more than one top-level node exists.
    pub fn finish(self, tokens: TokenStream) -> GrammarResult<SyntaxTree> {
        if !self.open.is_empty() {
            return Err(GrammarError::UnbalancedBuilder(self.open.len()));
        }
        let root = match self.pending.as_slice() {
            [] => return Err(GrammarError::EmptyTree),
            [root] => *root,
            roots => return Err(GrammarError::MultipleRoots(roots.len())),
        };
        if let Some(bad) = self
            .nodes
            .iter()
            .find(|n| n.last_token >= tokens.len())
        {
            return Err(GrammarError::TokenOutOfRange(bad.last_token));
        }
        Ok(SyntaxTree {
            nodes: self.nodes,
            root,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tsql;

    // "a = a" followed by EOF
    fn tokens() -> TokenStream {
        TokenStream::new(vec![
            Token::new(0, 0, "a"),
            Token::new(1, 1, " ").hidden(),
            Token::new(2, 2, "="),
            Token::new(3, 3, " ").hidden(),
            Token::new(4, 4, "a"),
            Token::eof(5, 5),
        ])
    }

    fn build() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.start_node(tsql::BATCH);
        let cp = b.checkpoint();
        b.start_node(tsql::EXPRESSION);
        b.token(0);
        b.finish_node();
        b.start_node_at(cp, tsql::PREDICATE);
        b.token(2);
        b.start_node(tsql::EXPRESSION);
        b.token(4);
        b.finish_node();
        b.finish_node();
        // empty rule is dropped
        b.start_node(tsql::SELECT_LIST);
        b.finish_node();
        b.token(5);
        b.finish_node();
        b.finish(tokens()).unwrap()
    }

    #[test]
    fn test_checkpoint_wraps_previous_sibling() {
        let tree = build();
        assert_eq!(
            tree.dump(tree.root()),
            r#"(BATCH (PREDICATE (EXPRESSION "a") "=" (EXPRESSION "a")) <EOF>)"#
        );
    }

    #[test]
    fn test_spans_and_text() {
        let tree = build();
        let predicate = tree.child_by_rule(tree.root(), tsql::PREDICATE).unwrap();
        assert_eq!(tree.span(predicate), 0..5);
        assert_eq!(tree.text(predicate), "a=a");
        assert_eq!(tree.source_text(predicate), "a = a");
        assert_eq!(tree.span(tree.root()), 0..5);
    }

    #[test]
    fn test_parent_links() {
        let tree = build();
        let terminal = tree.terminals(tree.root()).nth(2).unwrap();
        assert_eq!(tree.token(terminal).unwrap().text, "a");
        let path: Vec<_> = tree
            .ancestors(terminal)
            .filter_map(|n| tree.rule(n))
            .collect();
        assert_eq!(path, vec![tsql::EXPRESSION, tsql::PREDICATE, tsql::BATCH]);
    }

    #[test]
    fn test_unbalanced_builder() {
        let mut b = TreeBuilder::new();
        b.start_node(tsql::BATCH);
        b.token(0);
        assert!(matches!(
            b.finish(tokens()),
            Err(GrammarError::UnbalancedBuilder(1))
        ));
    }

    #[test]
    fn test_empty_tree() {
        let mut b = TreeBuilder::new();
        b.start_node(tsql::BATCH);
        b.finish_node();
        assert!(matches!(b.finish(tokens()), Err(GrammarError::EmptyTree)));
    }
}
