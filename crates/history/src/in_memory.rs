//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chinwag_core::error::PersistenceError;
use chinwag_core::history::HistoryStore;
use chinwag_core::message::Message;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A history store that holds messages in a Vec.
/// Nothing survives the process; `clear` never produces a backup.
pub struct InMemoryStore {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self) -> Result<Vec<Message>, PersistenceError> {
        Ok(self.messages.read().await.clone())
    }

    async fn save(&self, messages: &[Message]) -> Result<(), PersistenceError> {
        *self.messages.write().await = messages.to_vec();
        Ok(())
    }

    async fn clear(&self) -> Result<Option<PathBuf>, PersistenceError> {
        self.messages.write().await.clear();
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryStore::new();
        let messages = vec![Message::user("a"), Message::assistant("b")];
        store.save(&messages).await.unwrap();
        assert_eq!(store.load().await.unwrap(), messages);
    }

    #[tokio::test]
    async fn clear_empties_without_backup() {
        let store = InMemoryStore::new();
        store.save(&[Message::user("x")]).await.unwrap();
        assert!(store.clear().await.unwrap().is_none());
        assert!(store.load().await.unwrap().is_empty());
    }
}
