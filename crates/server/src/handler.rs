//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the hosted cache worker.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, partitions_impl, purge_impl};
use crate::tools::worker_fetch::{WorkerFetchParams, fetch_impl};
use crate::tools::worker_message::{WorkerMessageParams, message_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use wayfarer_client::{CacheWorker, MessageSender};

/// The main MCP server handler for wayfarer-worker.
#[derive(Clone)]
pub struct WorkerServer {
    worker: Arc<CacheWorker>,
    bus: MessageSender,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WorkerServer {
    /// Create a new server handler around a running worker and its message channel.
    pub fn new(worker: Arc<CacheWorker>, bus: MessageSender) -> Self {
        Self { worker, bus, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Run a request through the cache worker. Returns status, body, category and whether it came from network, cache, offline fallback or a synthetic response."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Post a control message (SKIP_WAITING, CLEAR_CACHE, INVALIDATE_CACHE with pattern) to the worker. Fire-and-forget."
    )]
    async fn worker_message(&self, params: Parameters<WorkerMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.bus, params.0).await
    }

    #[tool(description = "Look up a cached response across the current cache version's partitions.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete cached entries matching a URL substring, or every partition with all=true.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache partitions with their entry counts and the worker's lifecycle state.")]
    async fn cache_partitions(&self) -> Result<CallToolResult, McpError> {
        partitions_impl(&self.worker).await
    }
}

impl ServerHandler for WorkerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "wayfarer-worker".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
