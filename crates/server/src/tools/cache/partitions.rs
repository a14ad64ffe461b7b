//! cache_partitions tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayfarer_client::CacheWorker;

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartitionSummary {
    pub name: String,
    pub entries: usize,
    /// Whether the partition belongs to the running cache version.
    pub current: bool,
}

/// Output from the cache_partitions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePartitionsOutput {
    pub version: u32,
    /// Lifecycle state of the running version.
    pub state: String,
    /// Whether every seed asset of the running version was stored.
    pub installed: bool,
    pub partitions: Vec<PartitionSummary>,
}

/// Implementation of the cache_partitions tool.
pub async fn partitions_impl(worker: &CacheWorker) -> Result<CallToolResult, McpError> {
    let partitions = worker
        .partition_stats()
        .await?
        .into_iter()
        .map(|s| PartitionSummary { name: s.name, entries: s.entries, current: s.current })
        .collect();

    let state = worker.state().await.as_str().to_string();
    let installed = worker.is_installed().await;

    json_result(&CachePartitionsOutput { version: worker.config().cache_version, state, installed, partitions })
}
