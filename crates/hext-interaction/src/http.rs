//! Helpers shared by the HTTP agents.

use hext_core::config::AppConfig;
use hext_core::error::{HextError, Result};
use reqwest::header::HeaderValue;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Builds the client every agent shares, with the configured request timeout.
pub fn build_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(concat!("hext/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| HextError::internal(format!("Failed to build HTTP client: {err}")))
}

/// Maps a failure to obtain a response at all.
pub(crate) fn map_transport_error(service: &str, err: reqwest::Error) -> HextError {
    if err.is_timeout() {
        HextError::transport(format!("{service} request timed out: {err}"))
    } else {
        HextError::transport(format!("{service} request failed: {err}"))
    }
}

/// Turns a non-success response into an error, consuming the body.
pub(crate) async fn error_from_response(service: &str, response: Response) -> HextError {
    let status = response.status();
    let retry_after = parse_retry_after(response.headers().get("retry-after"));
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| format!("Failed to read {service} error body"));
    map_http_error(status, &body, retry_after)
}

pub(crate) fn map_http_error(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> HextError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            trimmed.to_string()
        }
    });
    HextError::from_status(status.as_u16(), message, retry_after)
}

/// Reads `{"error": "..."}` or `{"error": {"message": "..."}}`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}
