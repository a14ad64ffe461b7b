//! cache_get tool implementation.
//!
//! Looks a request up across the current version's partitions without
//! touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayfarer_client::CacheWorker;
use wayfarer_core::Error;

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL or site-relative path of the cached request.
    pub url: String,

    /// HTTP method the entry was stored under (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Partition holding the entry.
    pub partition: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8.
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &CacheWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let method = params.method.as_deref().unwrap_or("GET");
    let request = worker.request(method, &params.url)?;

    let (partition, response) = worker
        .lookup(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.to_string()))?;

    let output = CacheGetOutput {
        partition,
        url: request.url.to_string(),
        method: request.method,
        status: response.status,
        body: response.text(),
        headers: response.headers,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, worker};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let worker = worker(&[("/offline", "offline")]).await;
        let params = CacheGetParams { url: "/nowhere".into(), method: None };

        let result = get_impl(&worker, params).await;
        assert_eq!(result.unwrap_err().code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let worker = worker(&[("/offline", "offline page")]).await;
        let params = CacheGetParams { url: "/offline".into(), method: None };

        let result = get_impl(&worker, params).await.unwrap();
        let out: CacheGetOutput = output(&result);
        assert_eq!(out.partition, "wayfarer-v1-static");
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "offline page");
        assert!(out.headers.contains(&("content-type".to_string(), "text/html".to_string())));
    }

    #[tokio::test]
    async fn test_get_impl_other_method_misses() {
        let worker = worker(&[("/offline", "offline page")]).await;
        let params = CacheGetParams { url: "/offline".into(), method: Some("HEAD".into()) };

        assert!(get_impl(&worker, params).await.is_err());
    }
}
