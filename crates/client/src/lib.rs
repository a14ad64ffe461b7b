//! Client code for wayfarer.
//!
//! This crate provides the network fetch pipeline, the four cache strategies
//! and the cache worker that ties classification, strategies and lifecycle
//! together. The server binary hosts a [`CacheWorker`].

pub mod fetch;
pub mod strategy;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use strategy::{ResponseSource, Served, StrategyExecutor};
pub use worker::messages::spawn_listener;
pub use worker::{
    ActivationReport, CacheWorker, InstallReport, MessageOutcome, MessageSender, Outcome, PartitionStats, VersionState,
    WorkerMessage,
};

#[cfg(test)]
pub(crate) mod testing;
