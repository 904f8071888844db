//! Hosted LLM endpoint implementations for Chinwag.
//!
//! All providers implement the `chinwag_core::ChatProvider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
