//! The chat orchestrator — one turn at a time, history always consistent.

use crate::assembler::{ContextAssembler, WindowPolicy};
use chinwag_core::attachment::{Attachment, NormalizedContent, UploadedFile};
use chinwag_core::error::{Error, Result};
use chinwag_core::history::HistoryStore;
use chinwag_core::message::{ContentPart, Message};
use chinwag_core::provider::{ChatProvider, ChatRequest};
use chinwag_ingest::DecoderRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Unique identifier for a running session, used in log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat session: the explicit state object for one user's exchange.
///
/// Owns the in-memory history (loaded from the store at open), and runs
/// each turn to completion before the next begins. Exactly one writer per
/// store; two sessions on the same persisted path will trip the store's
/// conflict detection rather than overwrite each other.
pub struct ChatSession {
    id: SessionId,
    provider: Arc<dyn ChatProvider>,
    store: Arc<dyn HistoryStore>,
    registry: DecoderRegistry,
    assembler: ContextAssembler,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    preamble: Option<String>,
    messages: Vec<Message>,
}

impl ChatSession {
    /// Open a session: loads the persisted history through the store.
    pub async fn open(
        provider: Arc<dyn ChatProvider>,
        store: Arc<dyn HistoryStore>,
        registry: DecoderRegistry,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self> {
        let messages = store.load().await?;
        let id = SessionId::new();
        info!(session_id = %id, loaded = messages.len(), "Opened chat session");

        Ok(Self {
            id,
            provider,
            store,
            registry,
            assembler: ContextAssembler::default(),
            model: model.into(),
            temperature,
            max_tokens: None,
            preamble: None,
            messages,
        })
    }

    /// Set the history windowing policy.
    pub fn with_window(mut self, policy: WindowPolicy) -> Self {
        self.assembler = ContextAssembler::new(policy);
        self
    }

    /// Set the system preamble placed first in every request.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The current in-memory history (persisted state plus committed turns).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run one turn: ingest attachments, compose the user message,
    /// assemble the request window, invoke the model, commit the exchange.
    ///
    /// On an ingestion error the history is untouched. On a transport
    /// error only the user message is committed and persisted; the reply
    /// is never fabricated.
    pub async fn turn(&mut self, text: &str, uploads: &[UploadedFile]) -> Result<String> {
        // --- Ingest ---
        let mut attachments = Vec::with_capacity(uploads.len());
        for upload in uploads {
            attachments.push(self.registry.normalize(upload)?);
        }

        // --- Compose ---
        let pending = compose_user_message(text, &attachments);

        // --- Assemble ---
        let request_messages =
            self.assembler
                .assemble(&self.messages, self.preamble.as_deref(), pending.clone());

        info!(
            session_id = %self.id,
            history = self.messages.len(),
            window = request_messages.len(),
            attachments = attachments.len(),
            "Invoking model"
        );

        // --- Invoke ---
        let request = ChatRequest {
            model: self.model.clone(),
            messages: request_messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                // --- Commit ---
                let reply = response.message.content.display_text();
                self.messages.push(pending);
                self.messages.push(response.message);
                self.store.save(&self.messages).await?;
                Ok(reply)
            }
            Err(e) => {
                // The user message is committed; the reply never happened.
                warn!(session_id = %self.id, error = %e, "Model invocation failed");
                self.messages.push(pending);
                self.store.save(&self.messages).await?;
                Err(Error::Transport(e))
            }
        }
    }

    /// Clear the session and the persisted log. Returns the backup path
    /// when the store rotated one.
    pub async fn reset(&mut self) -> Result<Option<PathBuf>> {
        let backup = self.store.clear().await?;
        self.messages.clear();
        info!(session_id = %self.id, "Session reset");
        Ok(backup)
    }
}

/// Build the pending user message from prompt text plus normalized
/// attachments: multimodal parts when any image is present, otherwise
/// plain text with labeled attachment blocks under the prompt.
fn compose_user_message(text: &str, attachments: &[Attachment]) -> Message {
    if attachments.is_empty() {
        return Message::user(text);
    }

    let has_images = attachments.iter().any(Attachment::is_image);

    if has_images {
        let mut parts = Vec::new();
        if !text.is_empty() {
            parts.push(ContentPart::text(text));
        }
        for attachment in attachments {
            match &attachment.content {
                NormalizedContent::Text(body) => {
                    parts.push(ContentPart::text(attachment_block(&attachment.name, body)));
                }
                NormalizedContent::Image { media_type, data } => {
                    parts.push(ContentPart::image(media_type.clone(), data.clone()));
                }
            }
        }
        Message::user(parts)
    } else {
        let mut buffer = String::from(text);
        for attachment in attachments {
            let NormalizedContent::Text(body) = &attachment.content else {
                continue;
            };
            if !buffer.is_empty() {
                buffer.push_str("\n\n");
            }
            buffer.push_str(&attachment_block(&attachment.name, body));
        }
        Message::user(buffer)
    }
}

fn attachment_block(name: &str, body: &str) -> String {
    format!("[attachment: {name}]\n{body}")
}
