//! Provider trait — the abstraction over hosted LLM endpoints.
//!
//! A ChatProvider knows how to send an assembled message list to a model
//! and get a complete reply back. The call is blocking per turn: no partial
//! consumption happens in this core, and a caller-side timeout surfaces as
//! `TransportError::Timeout`.

use crate::error::TransportError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g. "gpt-4o")
    pub model: String,

    /// The assembled conversation window, oldest first
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, higher = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.1
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated assistant message
    pub message: Message,

    /// Token usage statistics, when the provider reports them
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model capability boundary.
///
/// Every hosted endpoint (OpenAI, OpenRouter, any compatible proxy)
/// implements this trait. The session calls `complete()` without knowing
/// which backend is configured.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A human-readable name for this provider (e.g. "openai").
    fn name(&self) -> &str;

    /// Send an assembled request and get a complete response.
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![],
            temperature: default_temperature(),
            max_tokens: None,
        };
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn request_serialization_omits_absent_max_tokens() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![],
            temperature: 0.1,
            max_tokens: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
    }
}
