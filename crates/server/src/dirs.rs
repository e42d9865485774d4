//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for config, data and cache directories.

use std::path::PathBuf;

const APP_NAME: &str = "essentials";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Directory holding `essentials.toml` and `messages.ron`
///
/// - Linux: `~/.config/essentials` (or `$XDG_CONFIG_HOME/essentials`)
/// - macOS: `~/Library/Application Support/essentials`
/// - Fallback: `./config`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./config"))
}

/// Directory holding saved homes and the custom spawn
///
/// - Linux: `~/.local/share/essentials` (or `$XDG_DATA_HOME/essentials`)
/// - macOS: `~/Library/Application Support/essentials`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Directory for log files
///
/// - Linux: `~/.cache/essentials/logs` (or `$XDG_CACHE_HOME/essentials/logs`)
/// - macOS: `~/Library/Caches/essentials/logs`
/// - Fallback: `/tmp/essentials/logs`
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/essentials"))
        .join("logs")
}
