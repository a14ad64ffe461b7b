//! worker_fetch tool implementation.
//!
//! Runs a request through the cache worker exactly as an intercepted page
//! request would be handled, and reports which strategy answered it.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayfarer_client::{CacheWorker, Outcome};
use wayfarer_core::{Category, Error};

use super::json_result;

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a site-relative path resolved against the origin.
    pub url: String,

    /// HTTP method (default: GET). Anything but GET bypasses the cache.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    pub status: u16,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// How the request was classified; absent for passthrough requests.
    pub category: Option<Category>,
    /// Where the response came from: network, cache, offline_fallback,
    /// synthetic or passthrough.
    pub source: String,
    /// Body decoded as UTF-8.
    pub body: String,
    /// ISO8601 timestamp of when the request was handled.
    pub handled_at: String,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &CacheWorker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = worker.request(&params.method, &params.url)?;
    let outcome = worker.handle_fetch(&request).await?;
    let handled_at = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let (category, source) = match &outcome {
        Outcome::Intercepted { category, served } => (Some(*category), served.source.as_str()),
        Outcome::Passthrough(_) => (None, "passthrough"),
    };
    let response = outcome.into_response();

    let output = WorkerFetchOutput {
        url: request.url.to_string(),
        method: request.method,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        category,
        source: source.to_string(),
        body: response.text(),
        handled_at,
    };

    json_result(&output)
}
