// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! An in-memory catalog with predefined schema data, built in code or loaded
//! from a JSON/YAML document of the form:
//!
//! ```yaml
//! databases:
//!   - name: Sales
//!     tables:
//!       - name: Orders
//!         schema: dbo
//!         columns:
//!           - { name: Id, data_type: int, is_primary_key: true }
//! ```
//!
//! It is always "available" for the databases it knows and "unavailable" for
//! every other database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::database::DatabaseCatalog;
use crate::r#trait::{CatalogLookup, CatalogProvider, CatalogSource, ConnectionContext};
use crate::{CatalogError, CatalogResult};

#[derive(Debug, Deserialize)]
struct StaticCatalogDocument {
    #[serde(default)]
    databases: Vec<DatabaseCatalog>,
}

/// Static catalog with predefined schema data
///
/// Used for tests, offline editing and as a [`CatalogSource`] behind the
/// background provider.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    databases: HashMap<String, Arc<DatabaseCatalog>>,
}

impl StaticCatalog {
    /// Create an empty static catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: register a database
    pub fn with_database(mut self, database: DatabaseCatalog) -> Self {
        self.insert(database);
        self
    }

    /// Register (or replace) a database
    pub fn insert(&mut self, database: DatabaseCatalog) {
        self.databases
            .insert(database.name.to_lowercase(), Arc::new(database));
    }

    /// Load a catalog from a JSON document
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let document: StaticCatalogDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Load a catalog from a YAML document
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        // Enum variants are written as single-key maps, as in JSON
        let document: StaticCatalogDocument = serde_yaml::with::singleton_map_recursive::deserialize(
            serde_yaml::Deserializer::from_str(yaml),
        )?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: StaticCatalogDocument) -> Self {
        document
            .databases
            .into_iter()
            .fold(Self::new(), |catalog, db| catalog.with_database(db))
    }

    /// Get a database by name (case-insensitive)
    pub fn database(&self, name: &str) -> Option<&Arc<DatabaseCatalog>> {
        self.databases.get(&name.to_lowercase())
    }

    /// Number of registered databases
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Whether no database is registered
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

impl CatalogProvider for StaticCatalog {
    fn get_catalog(&self, _connection: &ConnectionContext, database: &str) -> CatalogLookup {
        match self.database(database) {
            Some(catalog) => CatalogLookup::Available(catalog.clone()),
            None => CatalogLookup::Unavailable,
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load_database(
        &self,
        _connection: &ConnectionContext,
        database: &str,
    ) -> CatalogResult<DatabaseCatalog> {
        self.database(database)
            .map(|catalog| catalog.as_ref().clone())
            .ok_or_else(|| CatalogError::DatabaseNotFound(database.to_string()))
    }
}
