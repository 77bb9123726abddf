// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # T-SQL Insight - Semantic Layer
//!
//! Builds the per-document [`ParseSession`] snapshot.
//!
//! ## Overview
//!
//! A session is built once per reparse:
//! 1. The grammar produces an error-recovered tree and syntax errors
//! 2. The [`Validator`] walks the tree once, building the
//!    [`TempObjectRegistry`] and the [`ParseDiagnostic`] list
//! 3. The result is frozen; editors swap whole sessions, never mutate one
//!
//! ## Examples
//!
//! ```rust,ignore
//! use tsql_insight_semantic::{ParseSession, Validator};
//!
//! let validator = Validator::new(&classifier, catalogs.as_ref(), &connection);
//! let session = ParseSession::build(text, &grammar, &validator)?;
//! for diagnostic in session.diagnostics() {
//!     println!("{}:{} {}", diagnostic.line, diagnostic.start_offset, diagnostic.message);
//! }
//! ```

pub mod diagnostic;
pub mod error;
pub mod registry;
pub mod session;
pub mod validator;

// Re-export commonly used types
pub use diagnostic::{DiagnosticCode, ParseDiagnostic, Severity};
pub use error::{SessionError, SessionResult};
pub use registry::{TempObject, TempObjectRegistry};
pub use session::ParseSession;
pub use validator::{ValidationOutput, Validator};
