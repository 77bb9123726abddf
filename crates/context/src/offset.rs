// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Offset Resolution
//!
//! Maps a caret offset to a position in the tree. Offsets that land on
//! whitespace or comments resolve to the next terminal, with the covering
//! hidden token reported as the suggestion token.

use tsql_insight_grammar::{NodeId, SyntaxTree};

/// Tree position of a caret offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOffset {
    /// Index of the token the caret is in or touching, hidden tokens
    /// included; `None` when no token covers the offset
    pub suggest_token_index: Option<usize>,
    /// Terminal touching the offset, or the first terminal after it
    pub node_at: NodeId,
    /// Terminal preceding `node_at` in document order
    pub previous_node: Option<NodeId>,
}

/// Resolves caret offsets against a syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetResolver;

impl OffsetResolver {
    /// Resolve `offset` (in characters) to a [`TokenOffset`]
    ///
    /// Returns `None` only when the offset is past the end of the document
    /// or the tree has no terminals.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let output = grammar.parse("SELECT /* note */ a");
    /// let tree = output.tree.unwrap();
    /// let position = OffsetResolver.resolve(&tree, 10).unwrap();
    /// // The comment token covers offset 10
    /// assert_eq!(position.suggest_token_index, Some(2));
    /// ```
    pub fn resolve(&self, tree: &SyntaxTree, offset: usize) -> Option<TokenOffset> {
        let tokens = tree.tokens();
        if offset > tokens.document_len() {
            return None;
        }

        let mut previous = None;
        let mut last = None;
        for terminal in tree.terminals(tree.root()) {
            let Some(token) = tree.token(terminal) else {
                continue;
            };

            if !token.is_eof() && token.touches(offset) {
                return Some(TokenOffset {
                    suggest_token_index: Some(token.index),
                    node_at: terminal,
                    previous_node: previous,
                });
            }

            if token.start > offset || token.is_eof() {
                // The offset sits on a hidden token or past the last real one
                let from = if token.is_eof() {
                    token.index
                } else {
                    token.index.saturating_sub(1)
                };
                return Some(TokenOffset {
                    suggest_token_index: tokens.find_covering_backward(from, offset).map(|t| t.index),
                    node_at: terminal,
                    previous_node: previous,
                });
            }

            previous = Some(terminal);
            last = Some(terminal);
        }

        // Tree without an end-of-input terminal
        last.map(|node_at| TokenOffset {
            suggest_token_index: tokens.find_covering_backward(tokens.len(), offset).map(|t| t.index),
            node_at,
            previous_node: None,
        })
    }
}
