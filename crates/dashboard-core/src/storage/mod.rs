mod config;
pub mod database;
pub mod kv;
pub mod migrations;

pub use config::{Config, RemoteConfig, ServerConfig, TimerConfig, WeatherConfig};
pub use database::{Database, PomodoroSession, PomodoroStats, TaskStatus};
pub use kv::KvStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the dashboard data directory, creating it if needed.
///
/// `DASHBOARD_DATA_DIR` wins when set. Otherwise `~/.config/dashboard`, or
/// `~/.config/dashboard-dev` when `DASHBOARD_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DASHBOARD_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DASHBOARD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dashboard-dev")
            } else {
                base_dir.join("dashboard")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
