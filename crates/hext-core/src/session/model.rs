//! Conversation domain model.

use super::message::Message;
use super::naming::conversation_name;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat thread held by the session store.
///
/// The name is fixed at creation time and never empty; messages are only
/// ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format)
    pub id: String,
    /// Human-readable name shown in the conversation list
    pub name: String,
    /// Timestamp when the conversation was created (ISO 8601 format)
    pub created_at: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// Starts a conversation named after the user's first prompt.
    pub fn from_first_prompt(first_prompt: &str) -> Self {
        Self::named(conversation_name(first_prompt))
    }

    /// Starts a conversation with an explicit name.
    ///
    /// A blank name falls back to the same default as prompt-derived names.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            conversation_name("")
        } else {
            name
        };

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: chrono::Utc::now().to_rfc3339(),
            messages: Vec::new(),
        }
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
