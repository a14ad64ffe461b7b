//! Size-bounded FIFO eviction.
//!
//! Partitions carry no access timestamps, so insertion order is the only
//! notion of age: trimming drops the oldest-inserted entries, not the least
//! recently read ones.

use super::store::Partition;
use crate::Error;

/// Trim `partition` down to `max_entries`, deleting the oldest entries first.
///
/// Returns the number of entries deleted. A partition already within the
/// limit is left untouched, so repeated calls are no-ops.
pub async fn trim(partition: &Partition, max_entries: usize) -> Result<usize, Error> {
    let keys = partition.keys().await?;
    if keys.len() <= max_entries {
        return Ok(0);
    }

    let excess = keys.len() - max_entries;
    let mut deleted = 0;
    for request in keys.iter().take(excess) {
        if partition.delete(request).await? {
            deleted += 1;
        }
    }

    tracing::debug!(partition = partition.name(), deleted, max_entries, "trimmed cache partition");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{CacheDb, CacheStore, MemoryStore};
    use crate::{CacheRequest, CachedResponse};

    fn req(i: usize) -> CacheRequest {
        CacheRequest::get(&format!("https://wayfarer.example/api/attractions/{i}")).unwrap()
    }

    async fn fill(partition: &Partition, count: usize) {
        for i in 0..count {
            partition.put(&req(i), &CachedResponse::new(200, format!("{i}"))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_trim_boundary_deletes_earliest() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let partition = Partition::open(store, "wayfarer-v1-api").await.unwrap();
        fill(&partition, 31).await;

        let deleted = trim(&partition, 30).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(partition.len().await.unwrap(), 30);
        assert!(partition.get(&req(0)).await.unwrap().is_none());
        assert!(partition.get(&req(1)).await.unwrap().is_some());
        assert!(partition.get(&req(30)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_trim_idempotent_under_limit() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let partition = Partition::open(store, "wayfarer-v1-images").await.unwrap();
        fill(&partition, 5).await;

        assert_eq!(trim(&partition, 10).await.unwrap(), 0);
        assert_eq!(trim(&partition, 10).await.unwrap(), 0);
        assert_eq!(partition.len().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_trim_many_over_limit_sqlite() {
        let store: Arc<dyn CacheStore> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let partition = Partition::open(store, "wayfarer-v1-dynamic").await.unwrap();
        fill(&partition, 8).await;

        let deleted = trim(&partition, 3).await.unwrap();

        assert_eq!(deleted, 5);
        let remaining: Vec<CacheRequest> = partition.keys().await.unwrap();
        assert_eq!(remaining, vec![req(5), req(6), req(7)]);
    }

    #[tokio::test]
    async fn test_trim_is_fifo_not_lru() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let partition = Partition::open(store, "wayfarer-v1-api").await.unwrap();
        fill(&partition, 3).await;

        // Reading the oldest entry does not protect it.
        assert!(partition.get(&req(0)).await.unwrap().is_some());
        trim(&partition, 2).await.unwrap();

        assert!(partition.get(&req(0)).await.unwrap().is_none());
    }
}
