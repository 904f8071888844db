//! History trait — the durable, append-only exchange log.
//!
//! The sole persisted representation is the full message sequence; there
//! are no deltas. Implementations must make `save` atomic (a concurrent
//! reader never sees a partially written log) and must distinguish
//! "never written" (empty history) from "corrupt" (a `PersistenceError`).

use crate::error::PersistenceError;
use crate::message::Message;
use async_trait::async_trait;
use std::path::PathBuf;

/// Durable storage for the ordered exchange log.
///
/// Implementations: JSON file (durable), in-memory (tests, ephemeral
/// sessions).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g. "json_file", "in_memory").
    fn name(&self) -> &str;

    /// Load the persisted sequence. An absent store loads as empty;
    /// unreadable or unparseable data is an error, never silently empty.
    async fn load(&self) -> std::result::Result<Vec<Message>, PersistenceError>;

    /// Atomically overwrite the persisted sequence with `messages`.
    async fn save(&self, messages: &[Message]) -> std::result::Result<(), PersistenceError>;

    /// Reset the log to empty. Returns the path of a rotated backup when
    /// the implementation snapshots the prior content.
    async fn clear(&self) -> std::result::Result<Option<PathBuf>, PersistenceError>;
}
