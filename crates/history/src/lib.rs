//! History store implementations for Chinwag.
//!
//! All stores implement the `chinwag_core::HistoryStore` trait.
//! - `JsonFileStore` — durable single-file JSON log (the default)
//! - `InMemoryStore` — ephemeral, for tests and throwaway sessions

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
