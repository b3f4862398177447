//! Application configuration model.
//!
//! Mirrors `~/.config/hext/config.toml`. Every field has a default so a
//! missing file or a partial file still yields a working configuration.

use crate::error::{HextError, Result};
use crate::search::SearchPolicy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_CHAT_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
pub const DEFAULT_CAPTION_URL: &str =
    "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-base";
pub const DEFAULT_IMAGE_URL: &str =
    "https://api-inference.huggingface.co/models/black-forest-labs/FLUX.1-dev";
pub const DEFAULT_SEARCH_URL: &str = "https://api.duckduckgo.com/";

/// What the assistant produces for a plain text prompt.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum GenerationMode {
    /// Chat with the language model
    #[default]
    #[strum(to_string = "texto", serialize = "text")]
    Text,
    /// Send the prompt to the text-to-image model
    #[strum(to_string = "imagen", serialize = "image")]
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatModelConfig {
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Stream the final reply as server-sent events
    pub stream: bool,
}

impl Default for ChatModelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CHAT_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: 2048,
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub url: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CAPTION_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageGenerationConfig {
    pub url: String,
}

impl Default for ImageGenerationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IMAGE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub url: String,
    pub policy: SearchPolicy,
    /// Words that trigger a search under [`SearchPolicy::Keywords`]
    pub keywords: Vec<String>,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SEARCH_URL.to_string(),
            policy: SearchPolicy::default(),
            keywords: [
                "clima", "noticias", "hoy", "actual", "precio", "último", "ultima", "resultado",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            max_results: 3,
        }
    }
}

impl SearchConfig {
    /// Whether the user's text alone calls for a search before the model runs.
    pub fn searches_upfront(&self, user_text: &str) -> bool {
        match self.policy {
            SearchPolicy::Always => true,
            SearchPolicy::Keywords => {
                let lower = user_text.to_lowercase();
                self.keywords
                    .iter()
                    .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
            }
            SearchPolicy::ModelDecided | SearchPolicy::Never => false,
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chat: ChatModelConfig,
    pub caption: CaptionConfig,
    pub image: ImageGenerationConfig,
    pub search: SearchConfig,
    /// Generation mode at startup
    pub mode: GenerationMode,
    /// Answer greetings from the built-in dictionary
    pub canned_responses: bool,
    /// Answer "what day is it" locally
    pub date_shortcut: bool,
    /// Maximum number of earlier messages forwarded to the model
    pub history_limit: Option<usize>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat: ChatModelConfig::default(),
            caption: CaptionConfig::default(),
            image: ImageGenerationConfig::default(),
            search: SearchConfig::default(),
            mode: GenerationMode::default(),
            canned_responses: true,
            date_shortcut: true,
            history_limit: None,
            request_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Checks values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.chat.model.trim().is_empty() {
            return Err(HextError::config("chat.model is required"));
        }
        if self.chat.max_tokens == 0 {
            return Err(HextError::config("chat.max_tokens must be greater than 0"));
        }
        for (name, url) in [
            ("chat.url", &self.chat.url),
            ("caption.url", &self.caption.url),
            ("image.url", &self.image.url),
            ("search.url", &self.search.url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HextError::config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.search.max_results == 0 {
            return Err(HextError::config("search.max_results must be greater than 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(HextError::config(
                "request_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Hugging Face credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuggingFaceSecret {
    pub api_token: String,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub huggingface: Option<HuggingFaceSecret>,
}
