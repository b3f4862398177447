//! Secret configuration file storage.
//!
//! Loads the Hugging Face token from `~/.config/hext/secret.json`, falling
//! back to environment variables.

use hext_core::config::{HuggingFaceSecret, SecretConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables checked, in order, when secret.json has no token.
pub const TOKEN_ENV_VARS: &[&str] = &["HUGGINGFACE_API_TOKEN", "HF_TOKEN"];

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Neither secret.json nor the environment holds a token.
    MissingToken(PathBuf),
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Configuration file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::MissingToken(path) => write!(
                f,
                "Hugging Face token not found in {} or in {}",
                path.display(),
                TOKEN_ENV_VARS.join(" / ")
            ),
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Read-only apart from [`ensure_template`](Self::ensure_template), which
/// writes an empty skeleton for the user to fill in.
///
/// # Security Note
///
/// The token is stored as plaintext JSON.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and parses secret.json.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Returns the Hugging Face token.
    ///
    /// Priority:
    /// 1. secret.json (`huggingface.api_token`, if non-empty)
    /// 2. `HUGGINGFACE_API_TOKEN`
    /// 3. `HF_TOKEN`
    pub fn resolve_api_token(&self) -> Result<String, SecretStorageError> {
        self.resolve_api_token_with(|key| std::env::var(key).ok())
    }

    /// [`resolve_api_token`](Self::resolve_api_token) with an injectable
    /// environment lookup.
    pub fn resolve_api_token_with<F>(&self, env: F) -> Result<String, SecretStorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.load() {
            Ok(config) => {
                if let Some(token) = config
                    .huggingface
                    .map(|hf| hf.api_token.trim().to_string())
                    .filter(|token| !token.is_empty())
                {
                    return Ok(token);
                }
            }
            Err(SecretStorageError::NotFound(_)) => {}
            Err(e) => {
                tracing::warn!(
                    "[SecretStorage] Ignoring unreadable {}: {}",
                    self.path.display(),
                    e
                );
            }
        }

        TOKEN_ENV_VARS
            .iter()
            .filter_map(|key| env(key))
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty())
            .ok_or_else(|| SecretStorageError::MissingToken(self.path.clone()))
    }

    /// Creates secret.json with an empty token if it does not exist.
    ///
    /// Returns `true` when a file was written. On Unix the file is created
    /// with mode 600.
    pub fn ensure_template(&self) -> Result<bool, SecretStorageError> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            huggingface: Some(HuggingFaceSecret {
                api_token: String::new(),
            }),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(true)
    }
}
