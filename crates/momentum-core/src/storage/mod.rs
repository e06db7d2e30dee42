mod config;
pub mod database;
pub mod store;

pub use config::{Config, FocusConfig, PointsConfig, RewardsConfig, UsageConfig};
pub use database::Database;
pub use store::{keys, KvBackend, MemoryBackend, PersistentStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/momentum[-dev]/` based on MOMENTUM_ENV.
///
/// Set MOMENTUM_ENV=dev to use the development data directory, or
/// MOMENTUM_DATA_DIR to point at an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("MOMENTUM_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MOMENTUM_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("momentum-dev")
            } else {
                base_dir.join("momentum")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}
