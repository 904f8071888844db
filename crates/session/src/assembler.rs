//! Context assembly — builds the bounded request payload for one turn.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical inputs always produce identical
//! outputs. No I/O, no clock, no randomness.

use chinwag_core::message::{Message, Role};

/// How much of the stored history to include in the request window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// All stored messages
    #[default]
    Full,
    /// The most recent N messages by position
    LastN(usize),
}

/// The context assembler. Stateless — create one and reuse it.
///
/// Output order is fixed: preamble (when present) first, then the
/// windowed history oldest-first, then the pending message. Windowing
/// never reorders and never drops the pending message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler {
    policy: WindowPolicy,
}

impl ContextAssembler {
    pub fn new(policy: WindowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Assemble the ordered message list for a model call.
    pub fn assemble(
        &self,
        history: &[Message],
        preamble: Option<&str>,
        pending: Message,
    ) -> Vec<Message> {
        let window = match self.policy {
            WindowPolicy::Full => history,
            WindowPolicy::LastN(n) => &history[history.len().saturating_sub(n)..],
        };

        let mut messages = Vec::with_capacity(window.len() + 2);

        if let Some(preamble) = preamble.filter(|p| !p.trim().is_empty()) {
            messages.push(Message::system(preamble));
        }

        // The stored log never contains system messages; skip any that
        // slip through so the preamble stays the only one.
        messages.extend(
            window
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned(),
        );

        messages.push(pending);
        messages
    }
}
