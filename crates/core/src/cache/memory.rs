//! In-memory cache store.
//!
//! Keeps partitions and their entries in insertion order behind a tokio
//! RwLock. Used for tests and for workers that do not need persistence.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::key::request_key;
use super::store::CacheStore;
use crate::{CacheRequest, CachedResponse, Error};

struct StoredEntry {
    key: String,
    request: CacheRequest,
    response: CachedResponse,
}

#[derive(Default)]
struct MemoryPartition {
    name: String,
    entries: Vec<StoredEntry>,
}

impl MemoryPartition {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

/// In-memory [`CacheStore`].
///
/// An optional quota caps the total number of entries across partitions;
/// writes beyond it fail with [`Error::QuotaExceeded`] the way a browser
/// rejects a write when storage is full.
#[derive(Default)]
pub struct MemoryStore {
    partitions: RwLock<Vec<MemoryPartition>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once `max_entries` entries are held in total.
    pub fn with_quota(max_entries: usize) -> Self {
        Self { partitions: RwLock::new(Vec::new()), quota: Some(max_entries) }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        if !partitions.iter().any(|p| p.name == partition) {
            partitions.push(MemoryPartition { name: partition.to_string(), entries: Vec::new() });
        }
        Ok(())
    }

    async fn match_request(&self, partition: &str, request: &CacheRequest) -> Result<Option<CachedResponse>, Error> {
        let key = request_key(request);
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|p| p.name == partition)
            .and_then(|p| p.entries.iter().find(|e| e.key == key))
            .map(|e| e.response.clone()))
    }

    async fn put(&self, partition: &str, request: &CacheRequest, response: &CachedResponse) -> Result<(), Error> {
        let key = request_key(request);
        let mut partitions = self.partitions.write().await;

        if let Some(quota) = self.quota {
            let total: usize = partitions.iter().map(|p| p.entries.len()).sum();
            let replacing = partitions
                .iter()
                .find(|p| p.name == partition)
                .is_some_and(|p| p.position(&key).is_some());
            if !replacing && total >= quota {
                return Err(Error::QuotaExceeded(format!("{total} entries stored, quota is {quota}")));
            }
        }

        let idx = match partitions.iter().position(|p| p.name == partition) {
            Some(idx) => idx,
            None => {
                partitions.push(MemoryPartition { name: partition.to_string(), entries: Vec::new() });
                partitions.len() - 1
            }
        };

        let target = &mut partitions[idx];
        if let Some(pos) = target.position(&key) {
            target.entries.remove(pos);
        }
        target.entries.push(StoredEntry { key, request: request.clone(), response: response.clone() });
        Ok(())
    }

    async fn delete(&self, partition: &str, request: &CacheRequest) -> Result<bool, Error> {
        let key = request_key(request);
        let mut partitions = self.partitions.write().await;
        let Some(target) = partitions.iter_mut().find(|p| p.name == partition) else {
            return Ok(false);
        };
        match target.position(&key) {
            Some(pos) => {
                target.entries.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn keys(&self, partition: &str) -> Result<Vec<CacheRequest>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|p| p.name == partition)
            .map(|p| p.entries.iter().map(|e| e.request.clone()).collect())
            .unwrap_or_default())
    }

    async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions.iter().map(|p| p.name.clone()).collect())
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.partitions.write().await;
        let before = partitions.len();
        partitions.retain(|p| p.name != partition);
        Ok(partitions.len() != before)
    }
}
