//! The cache worker.
//!
//! Intercepts requests, classifies them and hands them to the
//! [`StrategyExecutor`]. Requests that are not GET over http(s), and every
//! request seen before the worker has claimed its clients, go straight to
//! the network without touching the cache.
//!
//! Lifecycle (install, activate) lives in [`lifecycle`]; the message channel
//! and its commands in [`messages`].

pub mod lifecycle;
pub mod messages;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;
use wayfarer_core::cache::partition::is_current;
use wayfarer_core::cache::{CacheStore, Purpose};
use wayfarer_core::{AppConfig, CacheRequest, CachedResponse, Category, Classifier, Error};

use crate::fetch::{Fetcher, resolve};
use crate::strategy::{Served, StrategyExecutor};

pub use lifecycle::{ActivationReport, InstallReport, VersionState};
pub use messages::{MessageOutcome, MessageSender, WorkerMessage};

use lifecycle::Lifecycle;

/// Result of handing a request to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Classified and served through a cache strategy.
    Intercepted { category: Category, served: Served },
    /// Forwarded to the network untouched.
    Passthrough(CachedResponse),
}

impl Outcome {
    pub fn response(&self) -> &CachedResponse {
        match self {
            Outcome::Intercepted { served, .. } => &served.response,
            Outcome::Passthrough(response) => response,
        }
    }

    pub fn into_response(self) -> CachedResponse {
        match self {
            Outcome::Intercepted { served, .. } => served.response,
            Outcome::Passthrough(response) => response,
        }
    }
}

/// Entry count of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub name: String,
    pub entries: usize,
    /// Whether the partition belongs to the running cache version.
    pub current: bool,
}

/// Request-caching worker for one cache version.
pub struct CacheWorker {
    config: AppConfig,
    origin: Url,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    classifier: Classifier,
    executor: StrategyExecutor,
    lifecycle: RwLock<Lifecycle>,
}

impl CacheWorker {
    /// Build a worker for the configured cache version.
    ///
    /// The worker starts in [`VersionState::Installing`] and does not
    /// intercept anything until [`CacheWorker::activate`] has run.
    pub fn new(config: AppConfig, store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {}", config.origin, e)))?;
        let offline = CacheRequest::from_url(resolve(&origin, &config.offline_path)?);

        let executor = StrategyExecutor::new(
            store.clone(),
            fetcher.clone(),
            &config.product,
            config.cache_version,
            config.limits,
            offline,
        );

        let classifier = Classifier::new(&config.routes);
        let lifecycle = RwLock::new(Lifecycle::new(config.cache_version));

        Ok(Self { config, origin, store, fetcher, classifier, executor, lifecycle })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve a site-relative path or absolute URL into a request.
    pub fn request(&self, method: &str, url: &str) -> Result<CacheRequest, Error> {
        let url = resolve(&self.origin, url)?;
        CacheRequest::new(method, url.as_str())
    }

    pub fn classify(&self, request: &CacheRequest) -> Category {
        self.classifier.classify(&request.url)
    }

    /// Handle an intercepted request.
    ///
    /// Intercepted requests always produce a response. Only passthrough
    /// requests can fail, and then with the network error itself.
    pub async fn handle_fetch(&self, request: &CacheRequest) -> Result<Outcome, Error> {
        if !request.is_interceptable() || !self.is_controlling().await {
            let response = self.fetcher.fetch(request).await?;
            return Ok(Outcome::Passthrough(response));
        }

        let category = self.classify(request);
        tracing::debug!(%request, %category, "intercepted request");
        let served = self.executor.execute(category, request).await;
        Ok(Outcome::Intercepted { category, served })
    }

    /// Look `request` up across the current version's partitions.
    ///
    /// Returns the partition it was found in alongside the response.
    pub async fn lookup(&self, request: &CacheRequest) -> Result<Option<(String, CachedResponse)>, Error> {
        for purpose in Purpose::ALL {
            let name = self.executor.partition_name(purpose);
            if let Some(found) = self.store.match_request(&name, request).await? {
                return Ok(Some((name, found)));
            }
        }
        Ok(None)
    }

    /// Entry counts for every partition in the store.
    pub async fn partition_stats(&self) -> Result<Vec<PartitionStats>, Error> {
        let mut stats = Vec::new();
        for name in self.store.list_partitions().await? {
            let entries = self.store.keys(&name).await?.len();
            let current = is_current(&name, &self.config.product, self.config.cache_version);
            stats.push(PartitionStats { name, entries, current });
        }
        Ok(stats)
    }

    /// State of the running cache version.
    pub async fn state(&self) -> VersionState {
        self.lifecycle.read().await.current_state()
    }

    /// Whether the worker has claimed its clients and intercepts requests.
    pub async fn is_controlling(&self) -> bool {
        self.lifecycle.read().await.controlling
    }
}
