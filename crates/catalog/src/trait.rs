// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog traits
//!
//! Two seams separate the engine from metadata retrieval:
//!
//! - [`CatalogProvider`] is what the engine calls. It is synchronous and must
//!   never block: when metadata is not loaded yet it answers
//!   [`CatalogLookup::Unavailable`] immediately.
//! - [`CatalogSource`] is the asynchronous loader behind a provider (a live
//!   connection, a file, a cache). Only providers talk to sources.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tsql_insight_ir::Dialect;

use crate::database::DatabaseCatalog;
use crate::error::CatalogResult;

/// Identity of the connection an editor document is bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionContext {
    /// Stable connection identifier (used as a cache key)
    pub connection_id: String,
    /// Current database of the connection
    pub default_database: String,
    /// Dialect spoken by the server
    #[serde(default)]
    pub dialect: Dialect,
}

impl ConnectionContext {
    /// Create a connection context
    pub fn new(connection_id: impl Into<String>, default_database: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            default_database: default_database.into(),
            dialect: Dialect::default(),
        }
    }

    /// Builder method: set the dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Answer of a synchronous catalog lookup
#[derive(Debug, Clone)]
pub enum CatalogLookup {
    /// Metadata for the database is loaded
    Available(Arc<DatabaseCatalog>),
    /// Metadata is not (yet) known; callers must degrade, not fail
    Unavailable,
}

impl CatalogLookup {
    /// The catalog, if available
    pub fn available(&self) -> Option<&Arc<DatabaseCatalog>> {
        match self {
            CatalogLookup::Available(catalog) => Some(catalog),
            CatalogLookup::Unavailable => None,
        }
    }

    /// Whether the lookup answered "unavailable"
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CatalogLookup::Unavailable)
    }
}

/// Synchronous catalog access used by the engine
///
/// Implementations must return promptly. Any fetch they trigger runs in the
/// background and only the newest request's result may be published.
pub trait CatalogProvider: Send + Sync {
    /// Get the catalog of `database` on the given connection
    fn get_catalog(&self, connection: &ConnectionContext, database: &str) -> CatalogLookup;
}

/// Asynchronous metadata loader
///
/// # Examples
///
/// ```rust,ignore
/// use tsql_insight_catalog::{CatalogSource, ConnectionContext};
///
/// async fn table_count(source: &impl CatalogSource) -> usize {
///     let connection = ConnectionContext::new("local", "Sales");
///     source
///         .load_database(&connection, "Sales")
///         .await
///         .map(|catalog| catalog.tables.len())
///         .unwrap_or(0)
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the full metadata of one database
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DatabaseNotFound` if the database doesn't exist.
    /// Returns `CatalogError::ConnectionFailed` if the server is unreachable.
    async fn load_database(
        &self,
        connection: &ConnectionContext,
        database: &str,
    ) -> CatalogResult<DatabaseCatalog>;
}
