mod config;
pub mod job_store;

pub use config::{AlertsConfig, Config};
pub use job_store::{JobStore, StoredJob};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `BIRTHDAYS_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/birthdays[-dev]/`, with `BIRTHDAYS_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("BIRTHDAYS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BIRTHDAYS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("birthdays-dev")
            } else {
                base_dir.join("birthdays")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
