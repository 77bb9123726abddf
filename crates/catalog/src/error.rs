// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.
//! Errors only surface from the asynchronous loading side; the synchronous
//! lookups used by the engine degrade to "unavailable" instead.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the server
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Metadata query failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Metadata query timed out
    #[error("Query timed out after {0}s")]
    QueryTimeout(u64),

    /// Requested database does not exist on the connection
    #[error("Database '{0}' not found")]
    DatabaseNotFound(String),

    /// Failed to serialize or deserialize schema data
    #[error("Failed to serialize schema data: {0}")]
    SerializationError(String),

    /// Permission denied for requested operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}
