//! Error types for the HEX assistant.

use std::time::Duration;
use thiserror::Error;

/// A shared error type for the entire workspace.
///
/// Variants follow the failure sources of a chat turn: the transport to an
/// external service, the service's own answer, and local concerns such as
/// configuration and templates.
#[derive(Error, Debug, Clone)]
pub enum HextError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The request never produced an HTTP response (DNS, connect, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider refused the request because of a rate limit
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The provider answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered, but not in a shape we understand
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Text shown in place of an assistant reply when the model is rate limited.
pub const RATE_LIMIT_REPLY: &str =
    "⏳ Se alcanzó el límite de solicitudes del modelo. Espera un momento e inténtalo de nuevo.";

impl HextError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an UnexpectedResponse error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Builds the error for a non-success HTTP status.
    ///
    /// Status 429, or a body that talks about a rate limit, becomes
    /// `RateLimited`; everything else is an `Api` error.
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = message.into();
        if status == 429 || mentions_rate_limit(&message) {
            return Self::RateLimited {
                message,
                retry_after,
            };
        }
        Self::Api { status, message }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Text to show the user in place of the assistant reply.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => RATE_LIMIT_REPLY.to_string(),
            other => format!("Ha ocurrido un error con la API: {other}"),
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("rate-limit") || lower.contains("too many requests")
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HextError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HextError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HextError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for HextError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

/// Conversion from anyhow::Error (used at the application boundary)
impl From<anyhow::Error> for HextError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, HextError>`.
pub type Result<T> = std::result::Result<T, HextError>;
