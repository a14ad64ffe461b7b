//! Scripted network and storage doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wayfarer_core::{CacheRequest, CacheStore, CachedResponse, Error, MemoryStore};

use crate::fetch::Fetcher;

/// Network double: answers from a route table, can be switched offline and
/// counts every fetch it sees. Unknown URLs answer 404.
pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, CachedResponse>>,
    online: AtomicBool,
    calls: AtomicUsize,
    latency: Mutex<Option<Duration>>,
}

impl FakeNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            latency: Mutex::new(None),
        })
    }

    pub(crate) fn route(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), CachedResponse::new(status, body.to_string()));
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {request}")));
        }

        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(404, "not found")))
    }
}

/// Storage double over a [`MemoryStore`] whose reads and partition deletes
/// can be made to fail.
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_reads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        })
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        self.inner.open(partition).await
    }

    async fn match_request(&self, partition: &str, request: &CacheRequest) -> Result<Option<CachedResponse>, Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::CorruptEntry(format!("unreadable {request} in {partition}")));
        }
        self.inner.match_request(partition, request).await
    }

    async fn put(&self, partition: &str, request: &CacheRequest, response: &CachedResponse) -> Result<(), Error> {
        self.inner.put(partition, request, response).await
    }

    async fn delete(&self, partition: &str, request: &CacheRequest) -> Result<bool, Error> {
        self.inner.delete(partition, request).await
    }

    async fn keys(&self, partition: &str) -> Result<Vec<CacheRequest>, Error> {
        self.inner.keys(partition).await
    }

    async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        self.inner.list_partitions().await
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::CorruptEntry(format!("partition {partition} is locked")));
        }
        self.inner.delete_partition(partition).await
    }
}
