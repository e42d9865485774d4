//! Content loaders for reading settings and message files.
//!
//! Settings are TOML (`essentials.toml`), message overrides are RON
//! (`messages.ron`). [`ContentFactory`] resolves both inside one directory.

pub mod config;
pub mod factory;
pub mod messages;

pub use config::{ConfigLoader, SettingsFile};
pub use factory::ContentFactory;
pub use messages::MessageLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
