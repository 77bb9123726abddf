// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # T-SQL Insight - Context Layer
//!
//! Position-aware analysis over an error-recovered syntax tree.
//!
//! ## Overview
//!
//! Everything here is a pure read of one immutable tree:
//!
//! - [`NodeKindClassifier`] maps grammar rules to semantic [`NodeKind`]s.
//!   All other components match on the kind instead of on rule ids.
//! - [`OffsetResolver`] maps a caret offset to a [`TokenOffset`], tolerating
//!   whitespace, comments and end-of-input.
//! - [`ScopeCollector`] computes the [`TableAlias`]es visible at a node,
//!   honouring subquery boundaries and APPLY / EXISTS correlation bridges.
//! - [`cst_utils`] holds the shared tree helpers (name extraction,
//!   identifier unquoting, innermost node lookup).
//!
//! ## Examples
//!
//! ```rust,ignore
//! use tsql_insight_context::{NodeKindClassifier, OffsetResolver, ScopeCollector};
//!
//! let classifier = NodeKindClassifier::tsql();
//! let at = OffsetResolver.resolve(&tree, offset)?;
//! let scope = ScopeCollector::new(&classifier).collect(&tree, at.node_at, "Sales");
//! for alias in &scope {
//!     println!("{}", alias);
//! }
//! ```

pub mod alias;
pub mod classify;
pub mod cst_utils;
pub mod offset;
pub mod scope;

// Re-export commonly used types
pub use alias::{AliasKind, CHANGE_TABLE_COLUMNS, TableAlias};
pub use classify::{NodeKind, NodeKindClassifier};
pub use cst_utils::{innermost_node_at, qualified_name, unquote_identifier};
pub use offset::{OffsetResolver, TokenOffset};
pub use scope::{ScopeCollector, ScopeResult, ScopeState};
