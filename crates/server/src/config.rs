//! Server configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dirs;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Holds `essentials.toml` and `messages.ron` unless overridden.
    pub config_dir: PathBuf,
    pub settings_path: Option<PathBuf>,
    pub messages_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Advance time only with the `tick` script command.
    pub manual_clock: bool,
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ESSENTIALS_CONFIG` - Settings file path (default: platform config dir)
    /// - `ESSENTIALS_MESSAGES` - Message overrides path (default: platform config dir)
    /// - `ESSENTIALS_DATA_DIR` - Saved homes and spawn (default: platform data dir)
    /// - `ESSENTIALS_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `ESSENTIALS_MANUAL_CLOCK` - Disable the real-time clock (default: false)
    pub fn from_env() -> Self {
        let mut manual_clock = read_env::<bool>("ESSENTIALS_MANUAL_CLOCK").unwrap_or(false);
        if !manual_clock && matches!(env::var("ESSENTIALS_MANUAL_CLOCK").as_deref(), Ok("")) {
            // A bare `ESSENTIALS_MANUAL_CLOCK=` also counts as set.
            manual_clock = true;
        }

        Self {
            config_dir: dirs::config_dir(),
            settings_path: read_path("ESSENTIALS_CONFIG"),
            messages_path: read_path("ESSENTIALS_MESSAGES"),
            data_dir: read_path("ESSENTIALS_DATA_DIR").unwrap_or_else(dirs::data_dir),
            log_dir: read_path("ESSENTIALS_LOG_DIR").unwrap_or_else(dirs::log_dir),
            manual_clock,
        }
    }
}

fn read_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}
