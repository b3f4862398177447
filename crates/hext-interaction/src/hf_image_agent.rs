//! HfImageAgent - text-to-image generation through the Hugging Face
//! inference API.
//!
//! The API answers with the encoded image itself, but some deployments wrap
//! it as base64 inside JSON. Both are accepted.

use crate::http::{error_from_response, extract_error_message, map_transport_error};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hext_core::agent::ImageGenerator;
use hext_core::config::ImageGenerationConfig;
use hext_core::error::{HextError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Value, json};

const SERVICE: &str = "Image model";

#[derive(Clone)]
pub struct HfImageAgent {
    client: Client,
    url: String,
    api_token: String,
}

impl HfImageAgent {
    pub fn new(
        client: Client,
        config: &ImageGenerationConfig,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_token: api_token.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for HfImageAgent {
    fn name(&self) -> &str {
        &self.url
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!("[HfImageAgent] POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "image/png")
            .json(&json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, response).await);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("json"));

        let bytes = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        decode_image_body(&bytes, is_json)
    }
}

fn decode_image_body(body: &[u8], is_json: bool) -> Result<Vec<u8>> {
    let looks_like_json = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{' || *b == b'[');

    if !is_json && !looks_like_json {
        if body.is_empty() {
            return Err(HextError::unexpected("Image model returned an empty body"));
        }
        return Ok(body.to_vec());
    }

    let text = String::from_utf8_lossy(body);
    if let Some(message) = extract_error_message(&text) {
        return Err(HextError::unexpected(message));
    }

    let value: Value = serde_json::from_str(&text)?;
    let encoded = find_base64(&value)
        .ok_or_else(|| HextError::unexpected("Image model response carries no image"))?;

    // Tolerate data URLs (`data:image/png;base64,...`).
    let encoded = encoded
        .split_once(";base64,")
        .map(|(_, data)| data)
        .unwrap_or(encoded);

    BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|err| HextError::unexpected(format!("Invalid base64 image: {err}")))
}

/// Looks for the image under `image`, `b64_json`, `data[0].b64_json` or a
/// top-level array's first element.
fn find_base64(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get("image")
            .or_else(|| map.get("b64_json"))
            .and_then(Value::as_str)
            .or_else(|| map.get("data").and_then(find_base64)),
        Value::Array(items) => items.first().and_then(find_base64),
        _ => None,
    }
}
