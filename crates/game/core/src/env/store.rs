use std::collections::BTreeMap;

use crate::state::{Location, PlayerId};

use super::StoreError;

/// A player's saved homes.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerHomes {
    pub homes: BTreeMap<String, Location>,
    /// Name of the home `home` without arguments travels to.
    pub last_used: Option<String>,
}

impl PlayerHomes {
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.homes.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.homes.keys().cloned().collect()
    }
}

/// Persistence of named locations and the custom spawn.
pub trait LocationStore {
    /// Homes of `player`; an unknown player has none.
    fn load_homes(&self, player: PlayerId) -> Result<PlayerHomes, StoreError>;

    fn save_homes(&self, player: PlayerId, homes: &PlayerHomes) -> Result<(), StoreError>;

    fn load_spawn(&self) -> Result<Option<Location>, StoreError>;

    fn save_spawn(&self, spawn: &Location) -> Result<(), StoreError>;
}
