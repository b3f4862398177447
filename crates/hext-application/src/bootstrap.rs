//! Application bootstrap.
//!
//! Resolves paths, loads `config.toml` and the API token, builds the HTTP
//! agents and hands back a ready `ChatUseCase`.

use crate::chat_usecase::{ChatServices, ChatUseCase};
use anyhow::{Context, Result};
use hext_core::config::{AppConfig, GenerationMode};
use hext_infrastructure::{ConfigStorage, HextPaths, ImageOutputDir, SecretStorage};
use hext_interaction::{DuckDuckGoSearch, HfCaptionAgent, HfChatAgent, HfImageAgent, build_client};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides applied on top of `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Root for config, secrets, logs and images instead of the platform dirs
    pub base_dir: Option<PathBuf>,
    /// Alternative `config.toml`
    pub config_path: Option<PathBuf>,
    pub mode: Option<GenerationMode>,
    pub stream: Option<bool>,
}

/// Everything the front end needs.
pub struct AppContext {
    pub paths: HextPaths,
    pub config: AppConfig,
    pub use_case: Arc<ChatUseCase>,
    pub images: ImageOutputDir,
}

/// Loads `config.toml` and applies the overrides.
pub fn load_config(paths: &HextPaths, options: &BootstrapOptions) -> Result<AppConfig> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| paths.config_file());

    let mut config = ConfigStorage::new(config_path.clone())
        .load()
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if let Some(stream) = options.stream {
        config.chat.stream = stream;
    }

    Ok(config)
}

/// Builds the HTTP agents, all sharing one client.
pub fn build_services(config: &AppConfig, api_token: &str) -> Result<ChatServices> {
    let client = build_client(config)?;

    Ok(ChatServices {
        chat: Arc::new(HfChatAgent::new(client.clone(), &config.chat, api_token)),
        captioner: Arc::new(HfCaptionAgent::new(client.clone(), &config.caption, api_token)),
        image_generator: Arc::new(HfImageAgent::new(client.clone(), &config.image, api_token)),
        search: Arc::new(DuckDuckGoSearch::new(client, &config.search)),
    })
}

/// Resolves the Hugging Face token, writing an empty secret.json template
/// for the user to fill in when none is found.
pub fn resolve_api_token(paths: &HextPaths) -> Result<String> {
    let storage = SecretStorage::with_path(paths.secret_file());

    match storage.resolve_api_token() {
        Ok(token) => Ok(token),
        Err(err) => {
            if storage.ensure_template().unwrap_or(false) {
                tracing::info!(
                    "[Bootstrap] Created secret template at {}",
                    storage.path().display()
                );
            }
            Err(err).context("Set huggingface.api_token in secret.json or export HF_TOKEN")
        }
    }
}

pub fn bootstrap(options: BootstrapOptions) -> Result<AppContext> {
    let paths = HextPaths::new(options.base_dir.as_deref())?;
    tracing::info!("[Bootstrap] Config dir: {}", paths.config_dir().display());

    let config = load_config(&paths, &options)?;
    tracing::info!(
        "[Bootstrap] Chat model: {} (stream={}, search={})",
        config.chat.model,
        config.chat.stream,
        config.search.policy
    );

    let api_token = resolve_api_token(&paths)?;
    let services = build_services(&config, &api_token)?;
    let use_case = Arc::new(ChatUseCase::new(&config, services));
    let images = ImageOutputDir::new(paths.images_dir());

    tracing::info!("[Bootstrap] Ready");
    Ok(AppContext {
        paths,
        config,
        use_case,
        images,
    })
}
