//! Filesystem side of HEX: where files live, and how configuration,
//! secrets and images are read and written.

pub mod image_files;
pub mod paths;
pub mod storage;

pub use crate::image_files::{ImageOutputDir, LoadedImage, load_image};
pub use crate::paths::{HextPaths, PathError};
pub use crate::storage::{ConfigStorage, ConfigStorageError, SecretStorage, SecretStorageError};
