//! Cache strategies.
//!
//! | Category      | Strategy                             | Partition |
//! |---------------|--------------------------------------|-----------|
//! | image         | stale-while-revalidate               | images    |
//! | api           | network-first                        | api       |
//! | static-asset  | cache-first                          | static    |
//! | dynamic-page  | network-first with offline fallback  | dynamic   |
//!
//! Every strategy returns a response; failures degrade to cached data or a
//! synthetic response and are never surfaced to the caller. Cache writes are
//! best-effort: a failed write or trim is logged and the response is still
//! served. Only status 200 responses are written, and every write to a bounded
//! partition is followed by a FIFO trim.

pub mod synthetic;

use std::sync::Arc;

use wayfarer_core::cache::{CacheStore, Partition, PartitionName, Purpose, trim};
use wayfarer_core::config::CacheLimits;
use wayfarer_core::{CacheRequest, CachedResponse, Category};

use crate::fetch::Fetcher;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Fresh from the network.
    Network,
    /// Cached entry for the request itself.
    Cache,
    /// The pre-cached offline page standing in for a navigation.
    OfflineFallback,
    /// Built locally because nothing else was available.
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::OfflineFallback => "offline_fallback",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// A response plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: CachedResponse,
    pub source: ResponseSource,
}

impl Served {
    fn new(response: CachedResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Runs the strategy for a classified request against an injected store
/// and network.
#[derive(Clone)]
pub struct StrategyExecutor {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    product: String,
    version: u32,
    limits: CacheLimits,
    offline: CacheRequest,
}

impl StrategyExecutor {
    pub fn new(
        store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>, product: &str, version: u32, limits: CacheLimits,
        offline: CacheRequest,
    ) -> Self {
        Self { store, fetcher, product: product.to_string(), version, limits, offline }
    }

    /// Name of the current version's partition for `purpose`.
    pub fn partition_name(&self, purpose: Purpose) -> String {
        PartitionName::new(&self.product, self.version, purpose).to_string()
    }

    /// Serve `request` with the strategy selected by `category`.
    pub async fn execute(&self, category: Category, request: &CacheRequest) -> Served {
        match category {
            Category::Image => self.stale_while_revalidate(request).await,
            Category::Api => self.network_first(request).await,
            Category::StaticAsset => self.cache_first(request).await,
            Category::DynamicPage => self.network_first_offline(request).await,
        }
    }

    /// Images: answer from cache at once and refresh in the background.
    pub async fn stale_while_revalidate(&self, request: &CacheRequest) -> Served {
        if let Some(cached) = self.lookup(Purpose::Images, request).await {
            tracing::debug!(%request, "image cache hit, revalidating in background");
            self.spawn_revalidation(Purpose::Images, request.clone());
            return Served::new(cached, ResponseSource::Cache);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.write_through(Purpose::Images, request, &response).await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(%request, "image fetch failed with empty cache: {e}");
                Served::new(synthetic::not_found("Image not found"), ResponseSource::Synthetic)
            }
        }
    }

    /// API: network first, cached copy when offline.
    pub async fn network_first(&self, request: &CacheRequest) -> Served {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.write_through(Purpose::Api, request, &response).await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(%request, "api fetch failed, trying cache: {e}");
                match self.lookup(Purpose::Api, request).await {
                    Some(cached) => Served::new(cached, ResponseSource::Cache),
                    None => Served::new(synthetic::api_unavailable(), ResponseSource::Synthetic),
                }
            }
        }
    }

    /// Static assets: an ok cached copy wins without touching the network.
    pub async fn cache_first(&self, request: &CacheRequest) -> Served {
        if let Some(cached) = self.lookup(Purpose::Static, request).await
            && cached.is_ok()
        {
            return Served::new(cached, ResponseSource::Cache);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.write_through(Purpose::Static, request, &response).await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(%request, "static asset fetch failed: {e}");
                Served::new(synthetic::not_found("Not found"), ResponseSource::Synthetic)
            }
        }
    }

    /// Pages: network first, then the cached page, then the offline page.
    pub async fn network_first_offline(&self, request: &CacheRequest) -> Served {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.write_through(Purpose::Dynamic, request, &response).await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(%request, "page fetch failed, falling back: {e}");
                if let Some(cached) = self.lookup(Purpose::Dynamic, request).await {
                    return Served::new(cached, ResponseSource::Cache);
                }
                if let Some(offline) = self.lookup_offline().await {
                    return Served::new(offline, ResponseSource::OfflineFallback);
                }
                Served::new(synthetic::offline(), ResponseSource::Synthetic)
            }
        }
    }

    /// The offline page may have been stored by install (static) or by a
    /// visit (dynamic), so every current partition is searched.
    async fn lookup_offline(&self) -> Option<CachedResponse> {
        for purpose in Purpose::ALL {
            if let Some(found) = self.lookup(purpose, &self.offline).await {
                return Some(found);
            }
        }
        None
    }

    async fn lookup(&self, purpose: Purpose, request: &CacheRequest) -> Option<CachedResponse> {
        let name = self.partition_name(purpose);
        match self.store.match_request(&name, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(partition = %name, %request, "cache lookup failed: {e}");
                None
            }
        }
    }

    /// Store a copy of `response` and trim the partition. Never fails.
    async fn write_through(&self, purpose: Purpose, request: &CacheRequest, response: &CachedResponse) {
        if !response.is_storable() {
            tracing::debug!(%request, status = response.status, "not caching non-200 response");
            return;
        }

        let partition = match Partition::open(self.store.clone(), self.partition_name(purpose)).await {
            Ok(partition) => partition,
            Err(e) => {
                tracing::warn!(%request, "failed to open cache partition: {e}");
                return;
            }
        };

        if let Err(e) = partition.put(request, response).await {
            tracing::warn!(partition = partition.name(), %request, "cache write failed: {e}");
            return;
        }

        if let Some(max_entries) = self.limits.for_purpose(purpose)
            && let Err(e) = trim(&partition, max_entries).await
        {
            tracing::warn!(partition = partition.name(), "cache trim failed: {e}");
        }
    }

    /// Detached refresh of a cached entry. The caller never waits on it and
    /// its outcome is only logged.
    fn spawn_revalidation(&self, purpose: Purpose, request: CacheRequest) {
        let store = self.store.clone();
        let fetcher = self.fetcher.clone();
        let name = self.partition_name(purpose);

        tokio::spawn(async move {
            match fetcher.fetch(&request).await {
                Ok(response) if response.is_storable() => {
                    if let Err(e) = store.put(&name, &request, &response).await {
                        tracing::debug!(partition = %name, %request, "revalidation write failed: {e}");
                    }
                }
                Ok(response) => {
                    tracing::debug!(%request, status = response.status, "revalidation kept stale entry");
                }
                Err(e) => {
                    tracing::debug!(%request, "revalidation failed: {e}");
                }
            }
        });
    }
}
