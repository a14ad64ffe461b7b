//! Install and activate.
//!
//! Install pre-caches the seed assets into the static partition as one
//! unit: either every seed is fetched and stored, or installation is
//! reported as failed. Activate sweeps every partition of the product that
//! belongs to another version, then claims the clients so requests start
//! being intercepted.

use std::collections::BTreeMap;

use serde::Serialize;
use wayfarer_core::cache::partition::is_stale;
use wayfarer_core::cache::{Partition, PartitionName, Purpose};
use wayfarer_core::{CacheRequest, CachedResponse, Error};

use super::CacheWorker;

/// Where a cache version is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionState {
    Installing,
    Active,
    Superseded,
}

impl VersionState {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionState::Installing => "installing",
            VersionState::Active => "active",
            VersionState::Superseded => "superseded",
        }
    }
}

/// Lifecycle bookkeeping shared behind the worker's lock.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    pub(crate) version: u32,
    pub(crate) versions: BTreeMap<u32, VersionState>,
    pub(crate) installed: bool,
    pub(crate) controlling: bool,
}

impl Lifecycle {
    pub(crate) fn new(version: u32) -> Self {
        Self {
            version,
            versions: BTreeMap::from([(version, VersionState::Installing)]),
            installed: false,
            controlling: false,
        }
    }

    pub(crate) fn current_state(&self) -> VersionState {
        self.versions.get(&self.version).copied().unwrap_or(VersionState::Installing)
    }
}

/// Result of [`CacheWorker::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Seed paths stored in the static partition.
    pub seeded: Vec<String>,
    /// Why installation failed, when it did.
    pub error: Option<String>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of [`CacheWorker::activate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// Stale partitions that were removed.
    pub deleted: Vec<String>,
    /// Stale partitions whose removal failed. They are retried at the next
    /// activation.
    pub failed: Vec<String>,
    /// Versions retired by this activation.
    pub superseded: Vec<u32>,
}

impl CacheWorker {
    /// Pre-cache every seed asset into the static partition.
    ///
    /// The static partition is opened first. All seeds are fetched before
    /// anything is stored; one failed or non-200 seed leaves the partition
    /// empty. Failure is reported,
    /// never raised, and the worker stays in [`VersionState::Installing`].
    pub async fn install(&self) -> InstallReport {
        let mut report = InstallReport::default();

        let name = self.executor.partition_name(Purpose::Static);
        let partition = match Partition::open(self.store.clone(), name).await {
            Ok(partition) => partition,
            Err(e) => {
                tracing::warn!("install failed, cannot open static partition: {e}");
                report.error = Some(e.to_string());
                return report;
            }
        };

        let mut fetched = Vec::with_capacity(self.config.seed_assets.len());
        for path in &self.config.seed_assets {
            match self.fetch_seed(path).await {
                Ok(pair) => fetched.push((path.clone(), pair)),
                Err(e) => {
                    tracing::warn!(seed = %path, "install failed: {e}");
                    report.error = Some(e.to_string());
                    return report;
                }
            }
        }

        for (path, (request, response)) in fetched {
            if let Err(e) = partition.put(&request, &response).await {
                tracing::warn!(seed = %path, "install failed while storing seed: {e}");
                report.error = Some(e.to_string());
                return report;
            }
            report.seeded.push(path);
        }

        self.lifecycle.write().await.installed = true;

        tracing::info!(
            version = self.config.cache_version,
            seeded = report.seeded.len(),
            "installed cache version"
        );
        report
    }

    async fn fetch_seed(&self, path: &str) -> Result<(CacheRequest, CachedResponse), Error> {
        let request = self.request("GET", path)?;
        let response = self.fetcher.fetch(&request).await?;
        if !response.is_storable() {
            return Err(Error::Network(format!("seed {} answered status {}", request.url, response.status)));
        }
        Ok((request, response))
    }

    /// Remove partitions of every other version and take control.
    ///
    /// Deletion failures are logged and listed in the report; they never
    /// block activation. Partitions outside the product's naming scheme are
    /// left alone.
    pub async fn activate(&self) -> ActivationReport {
        let mut report = ActivationReport::default();
        let product = &self.config.product;
        let version = self.config.cache_version;

        match self.store.list_partitions().await {
            Ok(names) => {
                for name in names.into_iter().filter(|n| is_stale(n, product, version)) {
                    match self.store.delete_partition(&name).await {
                        Ok(_) => {
                            tracing::info!(partition = %name, "deleted stale partition");
                            if let Some(parsed) = PartitionName::parse(&name)
                                && !report.superseded.contains(&parsed.version)
                            {
                                report.superseded.push(parsed.version);
                            }
                            report.deleted.push(name);
                        }
                        Err(e) => {
                            tracing::warn!(partition = %name, "failed to delete stale partition: {e}");
                            report.failed.push(name);
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("cannot list partitions, stale versions kept until next activation: {e}"),
        }

        let mut lifecycle = self.lifecycle.write().await;
        for retired in &report.superseded {
            lifecycle.versions.insert(*retired, VersionState::Superseded);
        }
        lifecycle.versions.insert(version, VersionState::Active);
        lifecycle.controlling = true;
        drop(lifecycle);

        tracing::info!(version, deleted = report.deleted.len(), "activated cache version");
        report
    }

    /// Known versions and their states, oldest first.
    pub async fn version_states(&self) -> Vec<(u32, VersionState)> {
        self.lifecycle.read().await.versions.iter().map(|(v, s)| (*v, *s)).collect()
    }

    /// Whether the current version's seed assets were all stored.
    pub async fn is_installed(&self) -> bool {
        self.lifecycle.read().await.installed
    }
}
