//! Control messages posted to the worker.
//!
//! Messages arrive as JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "SKIP_WAITING"}
//! {"type": "CLEAR_CACHE"}
//! {"type": "INVALIDATE_CACHE", "pattern": "/attractions/42"}
//! ```
//!
//! Posting is fire-and-forget: the sender gets no reply, and the listener
//! logs the outcome of every message it handles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wayfarer_core::Error;
use wayfarer_core::cache::partition::is_owned;

use super::{ActivationReport, CacheWorker, VersionState};

/// A control message understood by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Activate immediately instead of waiting for old clients to go away.
    SkipWaiting,
    /// Delete every partition of the product, all versions.
    ClearCache,
    /// Delete every entry whose URL contains `pattern`.
    InvalidateCache { pattern: String },
}

impl WorkerMessage {
    /// Parse a message posted as JSON.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::InvalidInput(format!("unrecognized message: {e}")))
    }
}

/// What handling a message did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    Activated(ActivationReport),
    AlreadyActive,
    Cleared { partitions: usize },
    Invalidated { entries: usize },
}

impl CacheWorker {
    /// Handle one control message.
    pub async fn handle_message(&self, message: WorkerMessage) -> Result<MessageOutcome, Error> {
        match message {
            WorkerMessage::SkipWaiting => {
                if self.state().await == VersionState::Active {
                    return Ok(MessageOutcome::AlreadyActive);
                }
                Ok(MessageOutcome::Activated(self.activate().await))
            }
            WorkerMessage::ClearCache => Ok(MessageOutcome::Cleared { partitions: self.clear_all().await? }),
            WorkerMessage::InvalidateCache { pattern } => {
                Ok(MessageOutcome::Invalidated { entries: self.invalidate(&pattern).await? })
            }
        }
    }

    /// Delete every partition of the product, all versions.
    ///
    /// Returns how many partitions were removed. Partitions of other
    /// applications, or outside the naming scheme, are not touched.
    pub async fn clear_all(&self) -> Result<usize, Error> {
        let mut cleared = 0;
        for name in self.store.list_partitions().await? {
            if is_owned(&name, &self.config.product) && self.store.delete_partition(&name).await? {
                cleared += 1;
            }
        }
        tracing::info!(partitions = cleared, "cleared cache");
        Ok(cleared)
    }

    /// Delete every entry, in every partition of the product, whose full URL
    /// contains `pattern` as a substring.
    ///
    /// Returns how many entries were removed.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize, Error> {
        if pattern.is_empty() {
            return Err(Error::InvalidInput("invalidation pattern must not be empty".into()));
        }

        let mut removed = 0;
        for name in self.store.list_partitions().await? {
            if !is_owned(&name, &self.config.product) {
                continue;
            }
            for request in self.store.keys(&name).await? {
                if request.url.as_str().contains(pattern) && self.store.delete(&name, &request).await? {
                    removed += 1;
                }
            }
        }
        tracing::info!(pattern, entries = removed, "invalidated cache entries");
        Ok(removed)
    }
}

/// Posting half of the worker's message channel.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl MessageSender {
    /// Post a message. Returns false once the listener has stopped.
    pub fn post(&self, message: WorkerMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Spawn the task that applies posted messages to `worker` in order.
///
/// The task ends when every [`MessageSender`] has been dropped.
pub fn spawn_listener(worker: Arc<CacheWorker>) -> (MessageSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            tracing::debug!(?message, "worker message received");
            match worker.handle_message(message).await {
                Ok(outcome) => tracing::debug!(?outcome, "worker message handled"),
                Err(e) => tracing::warn!("worker message failed: {e}"),
            }
        }
    });
    (MessageSender { tx }, handle)
}
