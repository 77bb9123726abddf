// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Background catalog provider
//!
//! [`BackgroundCatalogProvider`] answers lookups from an in-memory cache and
//! loads missing databases on a tokio runtime. A lookup that misses the cache
//! schedules a load and returns [`CatalogLookup::Unavailable`] right away.
//!
//! Every scheduled load carries a generation number. A load may only publish
//! its result while its generation is still the newest for that key, so a
//! slow fetch can never overwrite the answer of a newer one.
//!
//! A failed load is remembered. Lookups keep answering unavailable without
//! retrying until the database is refreshed or invalidated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::database::DatabaseCatalog;
use crate::error::CatalogResult;
use crate::r#trait::{CatalogLookup, CatalogProvider, CatalogSource, ConnectionContext};

#[derive(Debug, Default)]
struct CacheEntry {
    catalog: Option<Arc<DatabaseCatalog>>,
    generation: u64,
    in_flight: bool,
    failed: bool,
}

type Cache = Arc<Mutex<HashMap<String, CacheEntry>>>;

fn cache_key(connection: &ConnectionContext, database: &str) -> String {
    format!("{}/{}", connection.connection_id, database.to_lowercase())
}

fn lock(cache: &Cache) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Publish a load result if it is still the newest request for its key
fn publish(cache: &Cache, key: &str, generation: u64, result: CatalogResult<DatabaseCatalog>) -> bool {
    let mut entries = lock(cache);
    let Some(entry) = entries.get_mut(key) else {
        debug!(key, "Catalog entry invalidated before load finished");
        return false;
    };
    if entry.generation != generation {
        debug!(key, generation, newest = entry.generation, "Discarding stale catalog load");
        return false;
    }
    entry.in_flight = false;
    match result {
        Ok(catalog) => {
            debug!(key, tables = catalog.tables.len(), "Catalog loaded");
            entry.catalog = Some(Arc::new(catalog));
            true
        }
        Err(err) => {
            warn!(key, error = %err, "Catalog load failed");
            entry.failed = true;
            false
        }
    }
}

/// Non-blocking catalog provider backed by an asynchronous source
pub struct BackgroundCatalogProvider {
    source: Arc<dyn CatalogSource>,
    runtime: Handle,
    cache: Cache,
}

impl BackgroundCatalogProvider {
    /// Create a provider that spawns loads on the given runtime
    pub fn new(source: Arc<dyn CatalogSource>, runtime: Handle) -> Self {
        Self {
            source,
            runtime,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a provider on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Fails when called outside of a tokio runtime.
    pub fn try_current(
        source: Arc<dyn CatalogSource>,
    ) -> Result<Self, tokio::runtime::TryCurrentError> {
        Ok(Self::new(source, Handle::try_current()?))
    }

    /// Bump the generation of `key` and return the new value
    fn next_generation(&self, key: &str) -> u64 {
        let mut entries = lock(&self.cache);
        let entry = entries.entry(key.to_string()).or_default();
        entry.generation += 1;
        entry.in_flight = true;
        entry.failed = false;
        entry.generation
    }

    fn spawn_load(&self, connection: &ConnectionContext, database: &str) {
        let key = cache_key(connection, database);
        let generation = self.next_generation(&key);
        debug!(key = %key, generation, "Scheduling catalog load");

        let source = self.source.clone();
        let cache = self.cache.clone();
        let connection = connection.clone();
        let database = database.to_string();
        self.runtime.spawn(async move {
            let result = source.load_database(&connection, &database).await;
            publish(&cache, &key, generation, result);
        });
    }

    /// Reload a database in the background
    ///
    /// The cached snapshot keeps being served until the reload lands. Any
    /// load still running for the same database is superseded.
    pub fn refresh(&self, connection: &ConnectionContext, database: &str) {
        self.spawn_load(connection, database);
    }

    /// Forget the cached metadata of one database
    pub fn invalidate(&self, connection: &ConnectionContext, database: &str) {
        lock(&self.cache).remove(&cache_key(connection, database));
    }

    /// Load a database and wait for the result
    ///
    /// Returns `true` when the result was published, `false` when the load
    /// failed or was superseded by a newer request.
    pub async fn load_now(&self, connection: &ConnectionContext, database: &str) -> bool {
        let key = cache_key(connection, database);
        let generation = self.next_generation(&key);
        let result = self.source.load_database(connection, database).await;
        publish(&self.cache, &key, generation, result)
    }

    /// Whether a load for the database is currently running
    pub fn is_loading(&self, connection: &ConnectionContext, database: &str) -> bool {
        lock(&self.cache)
            .get(&cache_key(connection, database))
            .is_some_and(|entry| entry.in_flight)
    }
}

impl CatalogProvider for BackgroundCatalogProvider {
    fn get_catalog(&self, connection: &ConnectionContext, database: &str) -> CatalogLookup {
        let key = cache_key(connection, database);
        {
            let entries = lock(&self.cache);
            if let Some(entry) = entries.get(&key) {
                if let Some(catalog) = &entry.catalog {
                    return CatalogLookup::Available(catalog.clone());
                }
                if entry.in_flight || entry.failed {
                    return CatalogLookup::Unavailable;
                }
            }
        }
        self.spawn_load(connection, database);
        CatalogLookup::Unavailable
    }
}

impl std::fmt::Debug for BackgroundCatalogProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundCatalogProvider")
            .field("entries", &lock(&self.cache).len())
            .finish()
    }
}
