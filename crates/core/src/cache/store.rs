//! Cache store abstraction.
//!
//! The worker never reaches for ambient storage: everything goes through an
//! injected [`CacheStore`], usually shared as `Arc<dyn CacheStore>`.
//!
//! Guarantees every implementation must provide:
//! - a `put` is atomic per entry (readers see the old or the new response)
//! - `put` on an existing key replaces it and moves it to the end of the
//!   insertion order
//! - `keys` returns requests oldest first
//! - operations on a partition that was never opened behave as on an empty one

use std::sync::Arc;

use async_trait::async_trait;

use crate::{CacheRequest, CachedResponse, Error};

/// Named-partition request/response storage.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the partition if it does not exist yet.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    /// Look up the response stored for `request`.
    async fn match_request(&self, partition: &str, request: &CacheRequest) -> Result<Option<CachedResponse>, Error>;

    /// Store `response` for `request`, creating the partition when needed.
    async fn put(&self, partition: &str, request: &CacheRequest, response: &CachedResponse) -> Result<(), Error>;

    /// Remove the entry for `request`. Returns whether one existed.
    async fn delete(&self, partition: &str, request: &CacheRequest) -> Result<bool, Error>;

    /// Stored requests in insertion order, oldest first.
    async fn keys(&self, partition: &str) -> Result<Vec<CacheRequest>, Error>;

    /// Names of all partitions, in creation order.
    async fn list_partitions(&self) -> Result<Vec<String>, Error>;

    /// Drop a partition and every entry in it. Returns whether it existed.
    async fn delete_partition(&self, partition: &str) -> Result<bool, Error>;
}

/// Handle to one opened partition.
#[derive(Clone)]
pub struct Partition {
    store: Arc<dyn CacheStore>,
    name: String,
}

impl Partition {
    /// Open (creating if needed) the named partition.
    pub async fn open(store: Arc<dyn CacheStore>, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        store.open(&name).await?;
        Ok(Self { store, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, request: &CacheRequest) -> Result<Option<CachedResponse>, Error> {
        self.store.match_request(&self.name, request).await
    }

    pub async fn put(&self, request: &CacheRequest, response: &CachedResponse) -> Result<(), Error> {
        self.store.put(&self.name, request, response).await
    }

    pub async fn delete(&self, request: &CacheRequest) -> Result<bool, Error> {
        self.store.delete(&self.name, request).await
    }

    pub async fn keys(&self) -> Result<Vec<CacheRequest>, Error> {
        self.store.keys(&self.name).await
    }

    pub async fn len(&self) -> Result<usize, Error> {
        Ok(self.keys().await?.len())
    }
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition").field("name", &self.name).finish()
    }
}
