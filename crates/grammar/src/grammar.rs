// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Grammar seam
//!
//! The engine does not ship a SQL grammar. A [`Grammar`] turns document text
//! into an error-recovered [`SyntaxTree`] plus the syntax errors it found.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::tree::SyntaxTree;

/// A syntax error reported by the grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: String,
    /// Character range of the offending token
    pub range: Range<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Result of parsing one document
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Best-effort tree; `None` means the grammar is unusable
    pub tree: Option<SyntaxTree>,
    pub syntax_errors: Vec<SyntaxError>,
}

impl ParseOutput {
    pub fn new(tree: SyntaxTree, syntax_errors: Vec<SyntaxError>) -> Self {
        Self {
            tree: Some(tree),
            syntax_errors,
        }
    }

    /// Output of a grammar that failed to produce any tree
    pub fn failed(syntax_errors: Vec<SyntaxError>) -> Self {
        Self {
            tree: None,
            syntax_errors,
        }
    }
}

/// Error-tolerant SQL grammar
pub trait Grammar: Send + Sync {
    /// Human readable grammar name, used in logs
    fn name(&self) -> &str;

    /// Parse a whole document
    ///
    /// Implementations must recover from syntax errors and still return a
    /// tree covering the document whenever possible.
    fn parse(&self, text: &str) -> ParseOutput;
}
