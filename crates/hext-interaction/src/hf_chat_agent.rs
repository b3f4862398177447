//! HfChatAgent - chat completions through the Hugging Face router.
//!
//! The router speaks the OpenAI chat-completions dialect, both as a single
//! JSON response and as a server-sent events stream.

use crate::http::{error_from_response, map_transport_error};
use crate::sse::text_deltas;
use async_trait::async_trait;
use futures::StreamExt;
use hext_core::agent::{ChatMessage, ChatModel, ChatRequest, TextStream};
use hext_core::config::ChatModelConfig;
use hext_core::error::{HextError, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "Chat model";

/// Chat model agent talking to an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct HfChatAgent {
    client: Client,
    url: String,
    api_token: String,
    model: String,
    max_tokens: u32,
    description: String,
}

impl HfChatAgent {
    pub fn new(client: Client, config: &ChatModelConfig, api_token: impl Into<String>) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_token: api_token.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            description: format!("{} @ {}", config.model, config.url),
        }
    }

    async fn send_request(&self, request: &ChatRequest, stream: bool) -> Result<Response> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: self.max_tokens,
            stream,
        };

        tracing::debug!(
            "[HfChatAgent] POST {} ({} messages, stream={})",
            self.url,
            request.messages.len(),
            stream
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, response).await);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for HfChatAgent {
    fn name(&self) -> &str {
        &self.description
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let response = self.send_request(request, false).await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            HextError::unexpected(format!("Failed to parse chat model response: {err}"))
        })?;

        extract_text_response(parsed)
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream> {
        let response = self.send_request(request, true).await?;

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|err| map_transport_error(SERVICE, err))
            })
            .boxed();

        Ok(text_deltas(body))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| HextError::unexpected("Chat model returned no content in the response"))
}
