//! Error types for the Chinwag domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. None of these are
//! process-fatal: ingestion and transport failures abort only the in-flight
//! turn, persistence failures leave in-memory state intact so the caller
//! can retry the save.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Chinwag operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Attachment ingestion ---
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    // --- History persistence ---
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // --- Model transport ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Configuration ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures while normalizing an uploaded file into message content.
/// Every variant carries the file name so the caller can report which
/// upload broke the turn.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("Unsupported file type: {name} (.{extension} is not in the allow-list)")]
    UnsupportedType { name: String, extension: String },

    #[error("File too large: {name} is {size_bytes} bytes (limit {limit_bytes})")]
    TooLarge {
        name: String,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Invalid text encoding in {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Failed to parse {name}: {diagnostic}")]
    Malformed { name: String, diagnostic: String },
}

/// Failures reading or writing the persisted exchange log.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read history at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("History file at {path} is corrupt: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write history at {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error(
        "History at {path} was modified by another writer (expected revision {expected}, found {found})"
    )]
    Conflict {
        path: PathBuf,
        expected: u64,
        found: u64,
    },
}

/// Failures from the model capability boundary. Provider error text is
/// preserved verbatim, never masked behind a generic message.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_error_names_the_file() {
        let err = Error::Ingest(IngestError::Malformed {
            name: "data.csv".into(),
            diagnostic: "unequal lengths on line 3".into(),
        });
        assert!(err.to_string().contains("data.csv"));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn too_large_reports_both_sizes() {
        let err = IngestError::TooLarge {
            name: "big.pdf".into(),
            size_bytes: 5_242_881,
            limit_bytes: 5_242_880,
        };
        let msg = err.to_string();
        assert!(msg.contains("5242881"));
        assert!(msg.contains("5242880"));
    }

    #[test]
    fn transport_error_displays_correctly() {
        let err = Error::Transport(TransportError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn conflict_reports_revisions() {
        let err = PersistenceError::Conflict {
            path: PathBuf::from("/tmp/history.json"),
            expected: 4,
            found: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("revision 4"));
        assert!(msg.contains("found 7"));
    }
}
