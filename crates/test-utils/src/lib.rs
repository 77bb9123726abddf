// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for T-SQL Insight
//!
//! This crate provides common testing components including:
//! - A fixture T-SQL lexer and error-tolerant parser implementing `Grammar`
//! - Mock catalog implementations and the standard test schema
//! - Mock and heuristic rule oracles
//! - Cursor-marker helpers and sample documents
//! - Tracing initialisation for tests and benches

pub mod cursor;
pub mod fixtures;
pub mod lexer;
pub mod mock_catalog;
pub mod mock_oracle;
pub mod parser;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

// Re-exports for convenience
pub use cursor::{get_cursor_position, remove_cursor_marker, split_cursor};
pub use fixtures::SqlFixtures;
pub use lexer::tokenize;
pub use mock_catalog::{MockCatalogBuilder, STANDARD_DATABASE, UnavailableCatalog, standard_catalog};
pub use mock_oracle::{HeuristicRuleOracle, MockRuleOracle};
pub use parser::{FixtureGrammar, parse};

/// Install a `tracing` subscriber once per test binary
///
/// Honours `RUST_LOG`; defaults to `warn` so test output stays quiet.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
