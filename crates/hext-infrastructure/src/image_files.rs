//! Reading images the user uploads and writing images the model generates.

use chrono::Local;
use hext_core::error::{HextError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Infers the MIME type from a filename extension.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// File extension matching the encoded bytes' magic number.
fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF8") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "png"
    }
}

/// An image read from disk for captioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// Reads an image file, rejecting files whose extension is not an image type.
pub async fn load_image(path: &Path) -> Result<LoadedImage> {
    let mime_type = infer_mime_type(path);
    if !mime_type.starts_with("image/") {
        return Err(HextError::Io {
            message: format!(
                "'{}' is not an image (detected {})",
                path.display(),
                mime_type
            ),
        });
    }

    let bytes = fs::read(path).await.map_err(|e| HextError::Io {
        message: format!("Failed to read image '{}': {}", path.display(), e),
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(LoadedImage {
        bytes,
        mime_type,
        file_name,
    })
}

/// Directory where generated images are written.
#[derive(Debug, Clone)]
pub struct ImageOutputDir {
    root_dir: PathBuf,
}

impl ImageOutputDir {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Writes `bytes` to a new uniquely named file and returns its path.
    pub async fn save(&self, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root_dir).await.map_err(|e| HextError::Io {
            message: format!(
                "Failed to create image directory '{}': {}",
                self.root_dir.display(),
                e
            ),
        })?;

        let id = Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "hext-{}-{}.{}",
            Local::now().format("%Y%m%d-%H%M%S"),
            &id[..8],
            sniff_extension(bytes)
        );
        let path = self.root_dir.join(file_name);

        fs::write(&path, bytes).await.map_err(|e| HextError::Io {
            message: format!("Failed to write image '{}': {}", path.display(), e),
        })?;

        tracing::debug!("[ImageOutputDir] Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
