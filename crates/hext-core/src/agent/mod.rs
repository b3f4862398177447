//! Interfaces to the external services a chat turn depends on.
//!
//! The application layer only talks to these traits; `hext-interaction`
//! provides the HTTP implementations and tests provide fakes.

use crate::error::Result;
use crate::search::SourceCitation;
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};

/// A role-tagged message in the format chat-completion APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One request to the chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// Text deltas of a streamed reply.
pub type TextStream = BoxStream<'static, Result<String>>;

/// A hosted chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Short description used in logs.
    fn name(&self) -> &str;

    /// Returns the complete reply.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Returns the reply as a stream of text deltas.
    ///
    /// Models without streaming support yield the complete reply as a single
    /// delta.
    async fn stream(&self, request: &ChatRequest) -> Result<TextStream> {
        let reply = self.complete(request).await?;
        Ok(Box::pin(stream::once(async move { Ok(reply) })))
    }
}

/// A hosted image-captioning model.
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    fn name(&self) -> &str;

    /// Describes the image in one sentence.
    async fn caption(&self, image: &[u8], mime_type: &str) -> Result<String>;
}

/// A hosted text-to-image model.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Returns encoded image bytes (PNG or JPEG, as produced by the service).
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// A third-party web search provider.
#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Returns at most `max_results` snippet/URL pairs for `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceCitation>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct FixedModel;

    #[async_trait]
    impl ChatModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            Ok("respuesta completa".to_string())
        }
    }

    #[tokio::test]
    async fn test_default_stream_yields_single_delta() {
        let request = ChatRequest::new(vec![ChatMessage::user("hola")]);
        let deltas: Vec<String> = FixedModel
            .stream(&request)
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["respuesta completa".to_string()]);
    }
}
