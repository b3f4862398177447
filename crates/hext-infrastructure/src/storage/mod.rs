//! Loading of the configuration and secret files.

mod config_storage;
mod secret_storage;

pub use config_storage::{ConfigStorage, ConfigStorageError};
pub use secret_storage::{SecretStorage, SecretStorageError, TOKEN_ENV_VARS};
