//! Path resolution for HEX files.
//!
//! ```text
//! ~/.config/hext/              # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # Hugging Face token
//! └── logs/                    # Daily rolling log files
//!     └── hext.log.YYYY-MM-DD
//!
//! ~/.local/share/hext/         # Data directory
//! └── images/                  # Generated images
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "hext";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config or data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of every file HEX reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HextPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl HextPaths {
    /// Resolves the platform directories, or places everything under
    /// `base` when given (tests, portable installs).
    pub fn new(base: Option<&Path>) -> Result<Self, PathError> {
        match base {
            Some(base) => Ok(Self {
                config_dir: base.to_path_buf(),
                data_dir: base.to_path_buf(),
            }),
            None => {
                let config_dir = dirs::config_dir().ok_or(PathError::HomeDirNotFound)?;
                let data_dir = dirs::data_dir().ok_or(PathError::HomeDirNotFound)?;
                Ok(Self {
                    config_dir: config_dir.join(APP_DIR),
                    data_dir: data_dir.join(APP_DIR),
                })
            }
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// # Security Note
    ///
    /// Holds the API token in plaintext; keep it at 600.
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}
