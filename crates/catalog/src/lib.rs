// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # T-SQL Insight - Catalog Layer
//!
//! This crate provides database schema abstraction for the T-SQL Insight
//! engine. The engine never talks to a server itself: it asks a
//! [`CatalogProvider`] for a [`DatabaseCatalog`] snapshot and gets either the
//! metadata or an explicit "unavailable" answer.
//!
//! ## Providers
//!
//! - [`StaticCatalog`]: Schema definitions built in code or loaded from YAML/JSON
//! - [`BackgroundCatalogProvider`]: Cache in front of an async [`CatalogSource`],
//!   loading on a tokio runtime and discarding superseded results
//!
//! ## Usage
//!
//! ```rust
//! use tsql_insight_catalog::{CatalogProvider, ConnectionContext, DatabaseCatalog, StaticCatalog};
//! use tsql_insight_ir::{ObjectName, TableMetadata};
//!
//! let catalog = StaticCatalog::new().with_database(
//!     DatabaseCatalog::new("Sales").with_table(TableMetadata::new("Orders", "dbo")),
//! );
//! let connection = ConnectionContext::new("local", "Sales");
//!
//! let lookup = catalog.get_catalog(&connection, "Sales");
//! let sales = lookup.available().unwrap();
//! assert!(sales.find_table(&ObjectName::new("orders")).is_some());
//! ```

pub mod background;
pub mod database;
pub mod error;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use background::BackgroundCatalogProvider;
pub use database::{DEFAULT_SCHEMA, DatabaseCatalog};
pub use error::{CatalogError, CatalogResult};
pub use r#static::StaticCatalog;
pub use r#trait::{CatalogLookup, CatalogProvider, CatalogSource, ConnectionContext};
