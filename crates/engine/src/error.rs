// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Engine error types
//!
//! Only setup and editing fail with an error. Query operations (completion,
//! tooltips, links) answer `None` or a degraded result instead.

use tsql_insight_semantic::SessionError;

use crate::config::ConfigError;

/// Result type alias for engine setup and document editing
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while setting up the engine or editing a document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The grammar could not build a session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// An edit range that does not fit the document
    #[error("Invalid edit range {start}..{end} for a document of {len} characters")]
    InvalidEdit { start: usize, end: usize, len: usize },
}
