//! Session domain module.
//!
//! This module contains the conversation model and the in-memory store that
//! holds every conversation for the lifetime of the process.
//!
//! # Module Structure
//!
//! - `message`: Message types (`MessageRole`, `Message`)
//! - `model`: Conversation entity (`Conversation`)
//! - `naming`: Display-name derivation from the first prompt
//! - `store`: The session store (`SessionStore`)

mod message;
mod model;
mod naming;
mod store;

// Re-export public API
pub use message::{Message, MessageRole};
pub use model::Conversation;
pub use naming::{
    DEFAULT_CONVERSATION_NAME, IMAGE_CONVERSATION_NAME, MAX_NAME_CHARS, conversation_name,
};
pub use store::{ConversationSummary, SessionStore};
