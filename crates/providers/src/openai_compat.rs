//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, OpenRouter, and any endpoint exposing the
//! `/v1/chat/completions` shape.
//!
//! Supports chat completions with multimodal content: image parts travel
//! as `data:` URIs in `image_url` entries, with the detail hint attached.

use async_trait::async_trait;
use chinwag_core::error::TransportError;
use chinwag_core::message::{ContentPart, ImageDetail, Message, MessageContent, Role};
use chinwag_core::provider::{ChatProvider, ChatRequest, ChatResponse, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible chat provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an OpenRouter provider (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Convert our Message types to the OpenAI wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::System => "system".into(),
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                },
                content: Self::to_api_content(&m.content),
            })
            .collect()
    }

    fn to_api_content(content: &MessageContent) -> ApiContent {
        match content {
            MessageContent::Text(text) => ApiContent::Text(text.clone()),
            MessageContent::Parts(parts) => ApiContent::Parts(
                parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => ApiContentPart::Text { text: text.clone() },
                        ContentPart::Image { detail, .. } => ApiContentPart::ImageUrl {
                            image_url: ApiImageUrl {
                                // as_data_uri is Some for every image part
                                url: part.as_data_uri().unwrap_or_default(),
                                detail: match detail {
                                    ImageDetail::Low => "low".into(),
                                    ImageDetail::High => "high".into(),
                                },
                            },
                        },
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, TransportError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(TransportError::RateLimited { retry_after_secs: 5 });
        }

        if status == 401 || status == 403 {
            return Err(TransportError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(TransportError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| TransportError::Api {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Api {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            message,
            usage,
            model: api_response.model,
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Parts(Vec<ApiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentPart {
    Text { text: String },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize)]
struct ApiImageUrl {
    url: String,
    detail: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert!(provider.base_url.contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "https://example.com/v1/", "k");
        assert_eq!(provider.base_url, "https://example.com/v1");
    }

    #[test]
    fn message_conversion_roles() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi"),
        ];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 3);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[2].role, "assistant");
    }

    #[test]
    fn text_content_serializes_as_string() {
        let api = OpenAiCompatProvider::to_api_content(&MessageContent::Text("hi".into()));
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json, serde_json::json!("hi"));
    }

    #[test]
    fn image_parts_become_data_uri_entries() {
        let content = MessageContent::Parts(vec![
            ContentPart::text("what is this?"),
            ContentPart::image("image/jpeg", "QUJD"),
        ]);
        let json = serde_json::to_value(OpenAiCompatProvider::to_api_content(&content)).unwrap();

        let parts = json.as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "what is this?");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/jpeg;base64,QUJD"
        );
        assert_eq!(parts[1]["image_url"]["detail"], "low");
    }

    #[test]
    fn response_parsing() {
        let body = serde_json::json!({
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": "hello there"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        });
        let parsed: ApiResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.model, "gpt-4o");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello there"));
        assert_eq!(parsed.usage.as_ref().unwrap().total_tokens, 15);
    }
}
