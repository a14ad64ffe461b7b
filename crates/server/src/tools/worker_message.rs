//! worker_message tool implementation.
//!
//! Posts a control message onto the worker's channel. Delivery is
//! fire-and-forget: the tool returns once the message is queued, not once
//! it has been applied.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use wayfarer_client::{MessageSender, WorkerMessage};

use super::json_result;
use crate::error::WorkerError;

/// Input parameters for worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageParams {
    /// SKIP_WAITING, CLEAR_CACHE or INVALIDATE_CACHE.
    #[serde(rename = "type")]
    pub kind: String,

    /// URL substring to invalidate (INVALIDATE_CACHE only).
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Output structure for worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageOutput {
    /// Whether the message was queued.
    pub posted: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Build the message through the worker's JSON protocol.
fn parse(params: &WorkerMessageParams) -> Result<WorkerMessage, WorkerError> {
    let mut raw = json!({ "type": params.kind.trim().to_ascii_uppercase() });
    if let Some(pattern) = &params.pattern {
        raw["pattern"] = pattern.as_str().into();
    }

    let message =
        WorkerMessage::from_json(&raw.to_string()).map_err(|e| WorkerError::InvalidInput(e.to_string()))?;
    if let WorkerMessage::InvalidateCache { pattern } = &message
        && pattern.is_empty()
    {
        return Err(WorkerError::InvalidInput("INVALIDATE_CACHE requires a non-empty pattern".into()));
    }
    Ok(message)
}

/// Implementation of the worker_message tool.
pub async fn message_impl(bus: &MessageSender, params: WorkerMessageParams) -> Result<CallToolResult, McpError> {
    let message = parse(&params)?;
    tracing::debug!(?message, "posting worker message");

    if !bus.post(message) {
        return Err(WorkerError::ChannelClosed.into());
    }

    json_result(&WorkerMessageOutput { posted: true, kind: params.kind.trim().to_ascii_uppercase() })
}

#[cfg(test)]
mod tests {
    use wayfarer_client::spawn_listener;
    use wayfarer_core::CacheRequest;

    use super::*;
    use crate::tools::testing::{ORIGIN, output, worker};

    fn params(kind: &str, pattern: Option<&str>) -> WorkerMessageParams {
        WorkerMessageParams { kind: kind.into(), pattern: pattern.map(str::to_string) }
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(parse(&params("skip_waiting", None)).unwrap(), WorkerMessage::SkipWaiting);
        assert_eq!(parse(&params("CLEAR_CACHE", None)).unwrap(), WorkerMessage::ClearCache);
        assert_eq!(
            parse(&params("INVALIDATE_CACHE", Some("/api/"))).unwrap(),
            WorkerMessage::InvalidateCache { pattern: "/api/".into() }
        );
        assert!(parse(&params("INVALIDATE_CACHE", Some(""))).is_err());
        assert!(parse(&params("INVALIDATE_CACHE", None)).is_err());
        assert!(parse(&params("RESTART", None)).is_err());
    }

    #[test]
    fn test_parse_matches_posted_json() {
        for raw in [
            r#"{"type":"SKIP_WAITING"}"#,
            r#"{"type":"CLEAR_CACHE"}"#,
            r#"{"type":"INVALIDATE_CACHE","pattern":"/attractions/42"}"#,
        ] {
            let posted = WorkerMessage::from_json(raw).unwrap();
            let value: serde_json::Value = serde_json::from_str(raw).unwrap();
            let kind = value["type"].as_str().unwrap();
            let pattern = value["pattern"].as_str();
            assert_eq!(parse(&params(kind, pattern)).unwrap(), posted);
        }
    }

    #[test]
    fn test_parse_ignores_pattern_on_other_kinds() {
        assert_eq!(parse(&params("CLEAR_CACHE", Some("/api/"))).unwrap(), WorkerMessage::ClearCache);
    }

    #[tokio::test]
    async fn test_message_is_applied_by_listener() {
        let worker = worker(&[("/offline", "offline")]).await;
        let (bus, listener) = spawn_listener(worker.clone());

        let result = message_impl(&bus, params("INVALIDATE_CACHE", Some("/offline"))).await.unwrap();
        let out: WorkerMessageOutput = output(&result);
        assert!(out.posted);
        assert_eq!(out.kind, "INVALIDATE_CACHE");

        drop(bus);
        listener.await.unwrap();

        let request = CacheRequest::get(&format!("{ORIGIN}/offline")).unwrap();
        assert!(worker.lookup(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_message_after_listener_stopped() {
        let worker = worker(&[("/offline", "offline")]).await;
        let (bus, listener) = spawn_listener(worker);
        listener.abort();
        let _ = listener.await;

        let result = message_impl(&bus, params("CLEAR_CACHE", None)).await;
        assert_eq!(result.unwrap_err().code.0, -32000);
    }
}
