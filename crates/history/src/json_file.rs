//! File-based history store — a single human-readable JSON document.
//!
//! The persisted representation is always the full message sequence,
//! wrapped in a small envelope:
//!
//! ```json
//! {
//!   "schema": 1,
//!   "revision": 12,
//!   "messages": [ {"role": "user", "content": "...", "timestamp": "..."} ]
//! }
//! ```
//!
//! A bare top-level array (the format older logs used, with no envelope)
//! is accepted on load and treated as schema 0, revision 0; it gains the
//! envelope on the next save.
//!
//! Writes go to a temp file in the same directory followed by a rename,
//! so a concurrent reader never observes a partially written log. The
//! `revision` counter closes the last-writer-wins race between two stores
//! on the same path: `save` re-reads the on-disk revision and refuses to
//! overwrite a log another writer has moved.

use async_trait::async_trait;
use chinwag_core::error::PersistenceError;
use chinwag_core::history::HistoryStore;
use chinwag_core::message::Message;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    schema: u32,
    revision: u64,
    messages: Vec<Message>,
}

/// A history store backed by one JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    backup_on_clear: bool,
    /// Revision this store last observed on disk. `None` until the first
    /// load or save.
    revision: Mutex<Option<u64>>,
}

impl JsonFileStore {
    /// Create a store for the given path. The file is not touched until
    /// the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_on_clear: true,
            revision: Mutex::new(None),
        }
    }

    /// Control whether `clear` snapshots the prior log first.
    pub fn with_backup_on_clear(mut self, enabled: bool) -> Self {
        self.backup_on_clear = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. `Ok(None)` means the file does not exist.
    fn read_envelope(path: &Path) -> Result<Option<Envelope>, PersistenceError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| PersistenceError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Legacy format: a bare array of messages, no envelope.
        if value.is_array() {
            let messages: Vec<Message> =
                serde_json::from_value(value).map_err(|e| PersistenceError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            return Ok(Some(Envelope {
                schema: 0,
                revision: 0,
                messages,
            }));
        }

        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| PersistenceError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Some(envelope))
    }

    /// Serialize and atomically replace the file: temp sibling + rename.
    fn write_envelope(path: &Path, envelope: &Envelope) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Write {
                path: path.to_path_buf(),
                reason: format!("failed to create parent directory: {e}"),
            })?;
        }

        let content =
            serde_json::to_string_pretty(envelope).map_err(|e| PersistenceError::Write {
                path: path.to_path_buf(),
                reason: format!("serialization failed: {e}"),
            })?;

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, content).map_err(|e| PersistenceError::Write {
            path: temp_path.clone(),
            reason: e.to_string(),
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| PersistenceError::Write {
            path: path.to_path_buf(),
            reason: format!("rename from {} failed: {e}", temp_path.display()),
        })?;

        Ok(())
    }

    /// Backup file name: `<stem>-<UTC timestamp>.json.bak` beside the log.
    fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("history");
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        self.path.with_file_name(format!("{stem}-{stamp}.json.bak"))
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn load(&self) -> Result<Vec<Message>, PersistenceError> {
        let mut revision = self.revision.lock().await;
        match Self::read_envelope(&self.path)? {
            Some(envelope) => {
                debug!(
                    path = %self.path.display(),
                    schema = envelope.schema,
                    revision = envelope.revision,
                    count = envelope.messages.len(),
                    "Loaded history"
                );
                *revision = Some(envelope.revision);
                Ok(envelope.messages)
            }
            None => {
                // Never written: an empty log, distinct from a corrupt one.
                *revision = Some(0);
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, messages: &[Message]) -> Result<(), PersistenceError> {
        let mut revision = self.revision.lock().await;

        let on_disk = Self::read_envelope(&self.path)?
            .map(|e| e.revision)
            .unwrap_or(0);
        let expected = revision.unwrap_or(on_disk);

        if on_disk != expected {
            return Err(PersistenceError::Conflict {
                path: self.path.clone(),
                expected,
                found: on_disk,
            });
        }

        let envelope = Envelope {
            schema: SCHEMA_VERSION,
            revision: expected + 1,
            messages: messages.to_vec(),
        };
        Self::write_envelope(&self.path, &envelope)?;
        *revision = Some(envelope.revision);

        debug!(
            path = %self.path.display(),
            revision = envelope.revision,
            count = messages.len(),
            "Saved history"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<Option<PathBuf>, PersistenceError> {
        let backup = if self.backup_on_clear {
            match Self::read_envelope(&self.path)? {
                Some(envelope) if !envelope.messages.is_empty() => {
                    let backup_path = self.backup_path();
                    std::fs::copy(&self.path, &backup_path).map_err(|e| {
                        PersistenceError::Write {
                            path: backup_path.clone(),
                            reason: format!("backup copy failed: {e}"),
                        }
                    })?;
                    info!(backup = %backup_path.display(), "Rotated history to backup");
                    Some(backup_path)
                }
                _ => None,
            }
        } else {
            None
        };

        self.save(&[]).await?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chinwag_core::message::{ContentPart, MessageContent};

    fn store_at(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("chat_history.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);

        let messages = vec![
            Message::user("hello"),
            Message::assistant("hi"),
            Message::user(vec![
                ContentPart::text("see attached"),
                ContentPart::image("image/jpeg", "QUJD"),
            ]),
        ];
        store.load().await.unwrap();
        store.save(&messages).await.unwrap();

        // Reload through a fresh store — exact structural round trip.
        let store2 = store_at(&dir);
        let loaded = store2.load().await.unwrap();
        assert_eq!(loaded, messages);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
    }

    #[tokio::test]
    async fn legacy_bare_array_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(
            &path,
            r#"[
  {"role": "user", "content": "hello", "timestamp": "2026-01-01T00:00:00Z"},
  {"role": "assistant", "content": "hi", "timestamp": "2026-01-01T00:00:01Z"}
]"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, MessageContent::Text("hello".into()));

        // Next save upgrades to the enveloped format.
        store.save(&loaded).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["schema"], 1);
        assert_eq!(value["revision"], 1);
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_writer_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_history.json");

        let ours = JsonFileStore::new(&path);
        let theirs = JsonFileStore::new(&path);
        ours.load().await.unwrap();
        theirs.load().await.unwrap();

        ours.save(&[Message::user("ours")]).await.unwrap();

        // The other store still believes revision 0 — its save must fail
        // rather than silently discard our write.
        let err = theirs.save(&[Message::user("theirs")]).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict { .. }));

        // After reloading, the other store can write again.
        theirs.load().await.unwrap();
        theirs.save(&[Message::user("theirs")]).await.unwrap();
    }

    #[tokio::test]
    async fn clear_rotates_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.load().await.unwrap();
        store
            .save(&[Message::user("keep me"), Message::assistant("ok")])
            .await
            .unwrap();

        let backup = store.clear().await.unwrap().expect("backup expected");
        assert!(backup.exists());

        // The backup holds the prior content; the live file is empty.
        let backup_text = std::fs::read_to_string(&backup).unwrap();
        assert!(backup_text.contains("keep me"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_on_empty_log_makes_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.load().await.unwrap();
        assert!(store.clear().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_without_backup_option() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir).with_backup_on_clear(false);
        store.load().await.unwrap();
        store.save(&[Message::user("gone")]).await.unwrap();

        assert!(store.clear().await.unwrap().is_none());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.load().await.unwrap();
        store.save(&[Message::user("x")]).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
