//! cache_purge tool implementation.
//!
//! Synchronous counterpart of the CLEAR_CACHE and INVALIDATE_CACHE
//! messages: runs the purge immediately and reports what was deleted.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayfarer_client::CacheWorker;

use crate::error::WorkerError;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete entries whose URL contains this substring.
    pub pattern: Option<String>,

    /// Delete every partition of the product, all versions.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Entries removed by pattern.
    pub entries_deleted: usize,
    /// Partitions removed by `all`.
    pub partitions_deleted: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(worker: &CacheWorker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.pattern.is_none() && !params.all {
        return Err(WorkerError::InvalidInput("At least one of pattern or all must be specified".to_string()).into());
    }

    let mut output = CachePurgeOutput { entries_deleted: 0, partitions_deleted: 0 };

    if let Some(pattern) = &params.pattern {
        output.entries_deleted = worker.invalidate(pattern).await?;
    }

    if params.all {
        output.partitions_deleted = worker.clear_all().await?;
    }

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache::get::{CacheGetParams, get_impl};
    use crate::tools::testing::{output, worker};
    use crate::tools::worker_fetch::{WorkerFetchParams, fetch_impl};

    async fn visit(worker: &CacheWorker, path: &str) {
        fetch_impl(worker, WorkerFetchParams { url: path.into(), method: "GET".into() }).await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_by_pattern() {
        let worker = worker(&[
            ("/offline", "offline"),
            ("/attractions/42", "tower"),
            ("/attractions/43", "bridge"),
        ])
        .await;
        visit(&worker, "/attractions/42").await;
        visit(&worker, "/attractions/43").await;

        let params = CachePurgeParams { pattern: Some("/attractions/42".into()), all: false };
        let out: CachePurgeOutput = output(&purge_impl(&worker, params).await.unwrap());
        assert_eq!(out.entries_deleted, 1);
        assert_eq!(out.partitions_deleted, 0);

        let gone = get_impl(&worker, CacheGetParams { url: "/attractions/42".into(), method: None }).await;
        assert!(gone.is_err());
        let kept = get_impl(&worker, CacheGetParams { url: "/attractions/43".into(), method: None }).await;
        assert!(kept.is_ok());
    }

    #[tokio::test]
    async fn test_purge_all() {
        let worker = worker(&[("/offline", "offline"), ("/cities", "cities")]).await;
        visit(&worker, "/cities").await;

        let params = CachePurgeParams { pattern: None, all: true };
        let out: CachePurgeOutput = output(&purge_impl(&worker, params).await.unwrap());
        assert_eq!(out.partitions_deleted, 2);
        assert!(worker.partition_stats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_no_params() {
        let worker = worker(&[("/offline", "offline")]).await;
        let params = CachePurgeParams { pattern: None, all: false };

        let result = purge_impl(&worker, params).await;
        assert_eq!(result.unwrap_err().code.0, -32602);
    }

    #[tokio::test]
    async fn test_purge_empty_pattern() {
        let worker = worker(&[("/offline", "offline")]).await;
        let params = CachePurgeParams { pattern: Some(String::new()), all: false };

        assert!(purge_impl(&worker, params).await.is_err());
    }
}
