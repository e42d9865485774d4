//! File-based location store.

use std::fs;
use std::path::{Path, PathBuf};

use essentials_core::{Location, LocationStore, PlayerHomes, PlayerId, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{RepositoryError, Result};

/// File-based implementation of [`LocationStore`].
///
/// # File Format
///
/// ```text
/// base_dir/
/// ├── spawn.json
/// └── homes/
///     ├── player_1.json
///     └── player_2.json
/// ```
///
/// Files are pretty-printed JSON so server owners can edit them by hand.
/// Every write goes to a temp file first and is renamed into place.
#[derive(Debug)]
pub struct FileLocationStore {
    base_dir: PathBuf,
}

impl FileLocationStore {
    /// Create a store rooted at `base_dir`, creating directories as needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("homes"))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn homes_path(&self, player: PlayerId) -> PathBuf {
        self.base_dir
            .join("homes")
            .join(format!("player_{}.json", player.0))
    }

    fn spawn_path(&self) -> PathBuf {
        self.base_dir.join("spawn.json")
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let value = serde_json::from_slice(&bytes)?;
        tracing::debug!("Loaded {}", path.display());
        Ok(Some(value))
    }

    fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(value)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, path)?;

        tracing::debug!("Saved {}", path.display());
        Ok(())
    }
}

impl LocationStore for FileLocationStore {
    fn load_homes(&self, player: PlayerId) -> std::result::Result<PlayerHomes, StoreError> {
        Self::read(&self.homes_path(player))
            .map(Option::unwrap_or_default)
            .map_err(|e| StoreError::Load(player, e.to_string()))
    }

    fn save_homes(
        &self,
        player: PlayerId,
        homes: &PlayerHomes,
    ) -> std::result::Result<(), StoreError> {
        Self::write(&self.homes_path(player), homes)
            .map_err(|e| StoreError::Save(player, e.to_string()))
    }

    fn load_spawn(&self) -> std::result::Result<Option<Location>, StoreError> {
        Self::read(&self.spawn_path()).map_err(|e: RepositoryError| StoreError::Spawn(e.to_string()))
    }

    fn save_spawn(&self, spawn: &Location) -> std::result::Result<(), StoreError> {
        Self::write(&self.spawn_path(), spawn).map_err(|e| StoreError::Spawn(e.to_string()))
    }
}
