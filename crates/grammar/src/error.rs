// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for the parse model

use thiserror::Error;

/// Result type alias for grammar operations
pub type GrammarResult<T> = Result<T, GrammarError>;

/// Errors raised while assembling a syntax tree
///
/// These indicate a defective grammar implementation, never invalid SQL:
/// syntax errors in the document are reported as [`crate::SyntaxError`]
/// values alongside a recovered tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Tree builder finished with {0} open node(s)")]
    UnbalancedBuilder(usize),

    #[error("Tree builder produced no nodes")]
    EmptyTree,

    #[error("Tree builder produced {0} root nodes")]
    MultipleRoots(usize),

    #[error("Node refers to token {0} outside of the token stream")]
    TokenOutOfRange(usize),
}
