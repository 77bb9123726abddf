// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for parse sessions
//!
//! Query operations on a session never fail; only building one can.

use thiserror::Error;

/// Result type alias for session construction
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while building a [`crate::ParseSession`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The grammar produced no tree at all; this is a setup problem, not a
    /// problem with the document
    #[error("Grammar '{grammar}' produced no syntax tree ({errors} syntax errors)")]
    NoTree { grammar: String, errors: usize },
}
