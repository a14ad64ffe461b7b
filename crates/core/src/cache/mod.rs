//! Partitioned response cache.
//!
//! Responses live in named, versioned partitions (`{product}-v{N}-{purpose}`)
//! behind the [`CacheStore`] trait. It supports:
//!
//! - A persistent SQLite backend (tokio-rusqlite, WAL mode, migrations)
//! - An in-memory backend for tests and ephemeral workers
//! - Insertion-ordered keys per partition
//! - FIFO trimming to a maximum entry count

pub mod connection;
pub mod entries;
pub mod eviction;
pub mod key;
pub mod memory;
pub mod migrations;
pub mod partition;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use eviction::trim;
pub use memory::MemoryStore;
pub use partition::{PartitionName, Purpose};
pub use store::{CacheStore, Partition};
