mod config;
pub mod database;
pub mod store;

pub use config::{
    Config, ForecastConfig, ImportConfig, JourneySettings, LegacyMilestoneEntry, MomentumConfig,
    SchedulerConfig,
};
pub use database::Database;
pub use store::{PracticeStore, StoreKey};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/tenk[-dev]/` based on TENK_ENV.
///
/// Set TENK_ENV=dev to use the development data directory, or
/// TENK_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TENK_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TENK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tenk-dev")
            } else {
                base_dir.join("tenk")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
