//! Message domain types.
//!
//! These are the core value objects that flow through the entire system:
//! the user submits text plus attachments → the session composes a `Message` →
//! the assembler builds the request window → the provider returns a reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a message sender in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Preamble instructions, synthesized at assembly time — never persisted
    System,
    /// The end user
    User,
    /// The model's reply
    Assistant,
}

/// Message content: either a plain string or an ordered list of parts.
///
/// The two shapes are an explicit tagged union — code discriminates on the
/// variant, never on the runtime shape of a JSON value. On the wire a `Text`
/// message serializes as a bare string and a `Parts` message as an array,
/// which is exactly the persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Render the content as display text. Image parts collapse to a
    /// placeholder; this is for logs and terminal output, not for the model.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.clone(),
                    ContentPart::Image { media_type, .. } => {
                        format!("[image: {media_type}]")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Whether any part carries image data.
    pub fn has_images(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::Image { .. })),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// One element of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentPart {
    /// A text fragment.
    Text { text: String },
    /// An inline image, base64-encoded.
    Image {
        /// MIME type of the encoded bytes (e.g. "image/jpeg")
        media_type: String,
        /// Base64 payload (STANDARD alphabet, no data-URI prefix)
        data: String,
        /// Resolution hint forwarded to the provider
        #[serde(default)]
        detail: ImageDetail,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            media_type: media_type.into(),
            data: data.into(),
            detail: ImageDetail::default(),
        }
    }

    /// Render an image part as a `data:` URI, the wire form providers expect.
    pub fn as_data_uri(&self) -> Option<String> {
        match self {
            Self::Image {
                media_type, data, ..
            } => Some(format!("data:{media_type};base64,{data}")),
            Self::Text { .. } => None,
        }
    }
}

/// How much detail the provider should spend on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Low,
    High,
}

/// A single message in the exchange log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The content (plain string or multimodal parts)
    pub content: MessageContent,

    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system message. Only the assembler does this; system
    /// messages never enter the persisted log.
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, MessageContent::Text("Hello!".into()));
    }

    #[test]
    fn text_content_serializes_as_bare_string() {
        let msg = Message::user("plain");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], serde_json::json!("plain"));
        assert_eq!(json["role"], serde_json::json!("user"));
    }

    #[test]
    fn parts_content_serializes_as_array() {
        let msg = Message::user(vec![
            ContentPart::text("look at this"),
            ContentPart::image("image/jpeg", "aGVsbG8="),
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        let parts = json["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["kind"], "text");
        assert_eq!(parts[1]["kind"], "image");
        assert_eq!(parts[1]["detail"], "low");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user(vec![
            ContentPart::text("caption"),
            ContentPart::image("image/jpeg", "ZGF0YQ=="),
        ]);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn untagged_content_discriminates_on_shape() {
        let text: MessageContent = serde_json::from_str(r#""hi""#).unwrap();
        assert_eq!(text, MessageContent::Text("hi".into()));

        let parts: MessageContent =
            serde_json::from_str(r#"[{"kind":"text","text":"hi"}]"#).unwrap();
        assert!(matches!(parts, MessageContent::Parts(ref p) if p.len() == 1));
    }

    #[test]
    fn data_uri_rendering() {
        let part = ContentPart::image("image/jpeg", "QUJD");
        assert_eq!(
            part.as_data_uri().unwrap(),
            "data:image/jpeg;base64,QUJD"
        );
        assert!(ContentPart::text("x").as_data_uri().is_none());
    }

    #[test]
    fn has_images_detects_image_parts() {
        assert!(!Message::user("text only").content.has_images());
        let multimodal = Message::user(vec![
            ContentPart::text("t"),
            ContentPart::image("image/jpeg", "eA=="),
        ]);
        assert!(multimodal.content.has_images());
    }
}
