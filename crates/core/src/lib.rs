//! Core types and shared functionality for wayfarer.
//!
//! This crate provides:
//! - Request/response types captured by the cache worker
//! - Request classification by URL pattern
//! - Cache store abstraction with SQLite and in-memory backends
//! - Size-bounded FIFO eviction
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, CacheStore, MemoryStore, Partition, PartitionName, Purpose};
pub use classify::{Category, Classifier};
pub use config::AppConfig;
pub use error::Error;
pub use request::{CacheRequest, CachedResponse};
