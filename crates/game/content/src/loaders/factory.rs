//! Content factory for loading every content file from one directory.

use std::path::{Path, PathBuf};

use essentials_core::EngineConfig;

use crate::loaders::{ConfigLoader, LoadResult, MessageLoader};
use crate::messages::MessageCatalog;

/// Content factory that loads settings and messages from a config directory.
///
/// # Directory Structure
///
/// ```text
/// config_dir/
/// ├── essentials.toml
/// └── messages.ron
/// ```
///
/// Missing files are created from the shipped templates.
pub struct ContentFactory {
    config_dir: PathBuf,
}

impl ContentFactory {
    pub const SETTINGS_FILE: &'static str = "essentials.toml";
    pub const MESSAGES_FILE: &'static str = "messages.ron";

    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Load engine settings from `essentials.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load_or_create(&self.settings_path())
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(Self::SETTINGS_FILE)
    }

    /// Load the message catalog from `messages.ron`.
    pub fn load_messages(&self) -> LoadResult<MessageCatalog> {
        MessageLoader::load_or_create(&self.config_dir.join(Self::MESSAGES_FILE))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
