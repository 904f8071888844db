//! # Chinwag Core
//!
//! Domain types, traits, and error definitions for the Chinwag chat client.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod attachment;
pub mod error;
pub mod history;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use attachment::{Attachment, NormalizedContent, UploadedFile};
pub use error::{Error, IngestError, PersistenceError, Result, TransportError};
pub use history::HistoryStore;
pub use message::{ContentPart, ImageDetail, Message, MessageContent, Role};
pub use provider::{ChatProvider, ChatRequest, ChatResponse, Usage};
