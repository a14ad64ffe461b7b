//! wayfarer-worker entry point.
//!
//! Loads configuration, opens the SQLite cache, installs and activates the
//! cache worker, then serves MCP on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use wayfarer_client::{CacheWorker, FetchClient, FetchConfig, Fetcher, spawn_listener};
use wayfarer_core::{AppConfig, CacheDb, CacheStore};

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        product = %config.product,
        version = config.cache_version,
        "Starting wayfarer-worker on stdio transport"
    );

    let store: Arc<dyn CacheStore> = Arc::new(CacheDb::open(&config.db_path).await?);
    let fetcher: Arc<dyn Fetcher> = Arc::new(FetchClient::new(FetchConfig::from_app(&config))?);
    let worker = Arc::new(CacheWorker::new(config, store, fetcher)?);

    let installed = worker.install().await;
    if !installed.is_complete() {
        tracing::warn!(seeded = installed.seeded.len(), "install incomplete, activating without full seed set");
    }
    worker.activate().await;

    let (bus, listener) = spawn_listener(worker.clone());
    let handler = handler::WorkerServer::new(worker, bus);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    listener.abort();

    Ok(())
}
