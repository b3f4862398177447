//! `config.toml` storage.

use hext_core::config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading `config.toml`.
#[derive(Debug)]
pub enum ConfigStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    TomlParseError(toml::de::Error),
    /// The file parsed but holds unusable values.
    Invalid(String),
}

impl std::fmt::Display for ConfigStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigStorageError::TomlParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigStorageError::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigStorageError {}

impl From<std::io::Error> for ConfigStorageError {
    fn from(e: std::io::Error) -> Self {
        ConfigStorageError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigStorageError {
    fn from(e: toml::de::Error) -> Self {
        ConfigStorageError::TomlParseError(e)
    }
}

/// Read-only access to `config.toml`.
///
/// A missing or empty file yields [`AppConfig::default`]; a present file is
/// merged over the defaults field by field and then validated.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig, ConfigStorageError> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigStorage] {} not found, using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        let config: AppConfig = toml::from_str(&content)?;
        config
            .validate()
            .map_err(|e| ConfigStorageError::Invalid(e.to_string()))?;

        tracing::debug!("[ConfigStorage] Loaded {}", self.path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hext_core::search::SearchPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("config.toml"));
        assert_eq!(storage.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(ConfigStorage::new(path).load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            canned_responses = false
            mode = "image"

            [chat]
            stream = false

            [search]
            policy = "never"
            "#,
        )
        .unwrap();

        let config = ConfigStorage::new(path).load().unwrap();
        assert!(!config.canned_responses);
        assert!(!config.chat.stream);
        assert_eq!(config.search.policy, SearchPolicy::Never);
        assert_eq!(config.mode, hext_core::config::GenerationMode::Image);
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[chat\nmodel = ").unwrap();

        let result = ConfigStorage::new(path).load();
        assert!(matches!(result, Err(ConfigStorageError::TomlParseError(_))));
    }

    #[test]
    fn test_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = 0\n").unwrap();

        let result = ConfigStorage::new(path).load();
        assert!(matches!(result, Err(ConfigStorageError::Invalid(_))));
    }
}
