//! In-memory location store for tests and throwaway servers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use essentials_core::{Location, LocationStore, PlayerHomes, PlayerId, StoreError};

#[derive(Debug, Default)]
struct Inner {
    homes: HashMap<PlayerId, PlayerHomes>,
    spawn: Option<Location>,
}

/// In-memory implementation of [`LocationStore`].
///
/// Clones share the same storage, so a test can keep one clone to inspect
/// what the runtime saved.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStore for InMemoryLocationStore {
    fn load_homes(&self, player: PlayerId) -> Result<PlayerHomes, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Load(player, "lock poisoned".into()))?;
        Ok(inner.homes.get(&player).cloned().unwrap_or_default())
    }

    fn save_homes(&self, player: PlayerId, homes: &PlayerHomes) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Save(player, "lock poisoned".into()))?;
        inner.homes.insert(player, homes.clone());
        Ok(())
    }

    fn load_spawn(&self) -> Result<Option<Location>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Spawn("lock poisoned".into()))?;
        Ok(inner.spawn)
    }

    fn save_spawn(&self, spawn: &Location) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Spawn("lock poisoned".into()))?;
        inner.spawn = Some(*spawn);
        Ok(())
    }
}
