//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and purging the worker's
//! partitions directly, outside the request path.

pub mod get;
pub mod partitions;
pub mod purge;

pub use get::{CacheGetParams, get_impl};
pub use partitions::partitions_impl;
pub use purge::{CachePurgeParams, purge_impl};
