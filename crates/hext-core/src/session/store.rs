use super::message::Message;
use super::model::Conversation;
use crate::error::{HextError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lightweight view of a conversation for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub name: String,
    pub message_count: usize,
}

#[derive(Default)]
struct StoreState {
    /// Conversations in creation order
    conversations: Vec<Conversation>,
    /// Conversation receiving new input, if any
    active_id: Option<String>,
}

impl StoreState {
    fn find_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }
}

/// In-memory, process-lifetime store of conversations.
///
/// `SessionStore` is responsible for:
/// - Creating conversations on first input
/// - Appending messages in order
/// - Tracking which conversation is active
/// - Listing conversations for the front end
///
/// Nothing is persisted; dropping the store loses every conversation.
/// Cloning is cheap and yields a handle to the same state.
#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<StoreState>>,
}

impl SessionStore {
    /// Creates an empty store with no active conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a conversation and makes it active.
    ///
    /// # Returns
    ///
    /// The id of the new conversation.
    pub async fn create_conversation(&self, conversation: Conversation) -> String {
        let id = conversation.id.clone();
        let mut state = self.state.write().await;
        state.conversations.push(conversation);
        state.active_id = Some(id.clone());
        tracing::debug!("[SessionStore] Created conversation {}", id);
        id
    }

    /// Returns the active conversation id, creating a conversation named
    /// after `first_prompt` when none is active.
    pub async fn ensure_active(&self, first_prompt: &str) -> String {
        if let Some(id) = self.active_id().await {
            return id;
        }
        self.create_conversation(Conversation::from_first_prompt(first_prompt))
            .await
    }

    /// Returns the active conversation id, if any.
    pub async fn active_id(&self) -> Option<String> {
        self.state.read().await.active_id.clone()
    }

    /// Makes an existing conversation active.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no conversation has the given id.
    pub async fn set_active(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if state.find(id).is_none() {
            return Err(HextError::not_found("conversation", id));
        }
        state.active_id = Some(id.to_string());
        Ok(())
    }

    /// Clears the active conversation so the next input starts a new one.
    pub async fn clear_active(&self) {
        self.state.write().await.active_id = None;
    }

    /// Appends a message to a conversation.
    ///
    /// # Returns
    ///
    /// The number of messages in the conversation after the append.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no conversation has the given id.
    pub async fn append(&self, id: &str, message: Message) -> Result<usize> {
        let mut state = self.state.write().await;
        let conversation = state
            .find_mut(id)
            .ok_or_else(|| HextError::not_found("conversation", id))?;
        conversation.push(message);
        Ok(conversation.len())
    }

    /// Returns a snapshot of a conversation.
    pub async fn get(&self, id: &str) -> Option<Conversation> {
        self.state.read().await.find(id).cloned()
    }

    /// Returns a snapshot of the active conversation.
    pub async fn active(&self) -> Option<Conversation> {
        let state = self.state.read().await;
        let id = state.active_id.as_deref()?;
        state.find(id).cloned()
    }

    /// Returns the messages of a conversation in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no conversation has the given id.
    pub async fn history(&self, id: &str) -> Result<Vec<Message>> {
        self.state
            .read()
            .await
            .find(id)
            .map(|c| c.messages().to_vec())
            .ok_or_else(|| HextError::not_found("conversation", id))
    }

    /// Lists conversations in creation order.
    pub async fn list(&self) -> Vec<ConversationSummary> {
        self.state
            .read()
            .await
            .conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                message_count: c.len(),
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.conversations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.conversations.is_empty()
    }
}
