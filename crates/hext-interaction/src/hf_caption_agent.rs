//! HfCaptionAgent - image captioning through the Hugging Face inference API.

use crate::http::{error_from_response, extract_error_message, map_transport_error};
use async_trait::async_trait;
use hext_core::agent::ImageCaptioner;
use hext_core::config::CaptionConfig;
use hext_core::error::{HextError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

const SERVICE: &str = "Caption model";

#[derive(Clone)]
pub struct HfCaptionAgent {
    client: Client,
    url: String,
    api_token: String,
}

impl HfCaptionAgent {
    pub fn new(client: Client, config: &CaptionConfig, api_token: impl Into<String>) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_token: api_token.into(),
        }
    }
}

#[async_trait]
impl ImageCaptioner for HfCaptionAgent {
    fn name(&self) -> &str {
        &self.url
    }

    async fn caption(&self, image: &[u8], mime_type: &str) -> Result<String> {
        tracing::debug!(
            "[HfCaptionAgent] POST {} ({} bytes, {})",
            self.url,
            image.len(),
            mime_type
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, mime_type)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        parse_caption(&body)
    }
}

#[derive(Deserialize)]
struct Caption {
    generated_text: String,
}

/// Accepts `[{"generated_text": ..}]` or a bare `{"generated_text": ..}`.
fn parse_caption(body: &str) -> Result<String> {
    if let Some(message) = extract_error_message(body) {
        return Err(HextError::unexpected(message));
    }

    let caption = serde_json::from_str::<Vec<Caption>>(body)
        .ok()
        .and_then(|captions| captions.into_iter().next())
        .or_else(|| serde_json::from_str::<Caption>(body).ok())
        .map(|caption| caption.generated_text.trim().to_string())
        .filter(|text| !text.is_empty());

    caption.ok_or_else(|| HextError::unexpected(format!("No caption in response: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent(server: &MockServer) -> HfCaptionAgent {
        let config = CaptionConfig { url: server.uri() };
        HfCaptionAgent::new(Client::new(), &config, "hf_test")
    }

    #[test]
    fn test_parse_caption_shapes() {
        assert_eq!(
            parse_caption(r#"[{"generated_text": " a tiger lying on grass "}]"#).unwrap(),
            "a tiger lying on grass"
        );
        assert_eq!(
            parse_caption(r#"{"generated_text": "a cat"}"#).unwrap(),
            "a cat"
        );
        assert!(parse_caption("[]").is_err());
        assert!(parse_caption(r#"{"error": "Model is loading"}"#).is_err());
    }

    #[tokio::test]
    async fn test_caption_sends_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "image/png"))
            .and(header("authorization", "Bearer hf_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"generated_text": "a tiger lying on grass"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let caption = agent(&server)
            .caption(&[0x89, b'P', b'N', b'G'], "image/png")
            .await
            .unwrap();
        assert_eq!(caption, "a tiger lying on grass");
    }

    #[tokio::test]
    async fn test_caption_model_loading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": "Model Salesforce/blip-image-captioning-base is currently loading",
                "estimated_time": 20.0
            })))
            .mount(&server)
            .await;

        let err = agent(&server)
            .caption(b"bytes", "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, HextError::Api { status: 503, .. }));
        assert!(err.user_message().contains("currently loading"));
    }
}
