//! Traits describing the engine's external collaborators.
//!
//! The engine never owns player, world or persistence state. It reads the
//! live values through these oracles at every decision point. The [`Env`]
//! aggregate bundles them so entry points take a single argument.
mod error;
mod messages;
mod players;
mod store;
mod world;

pub use error::{StoreError, WorldError};
pub use messages::{MessageKey, Messenger, Notice, Substitutions};
pub use players::PlayerDirectory;
pub use store::{LocationStore, PlayerHomes};
pub use world::WorldOracle;

/// Aggregates the collaborators required by engine entry points.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    players: &'a dyn PlayerDirectory,
    world: &'a dyn WorldOracle,
    messenger: &'a dyn Messenger,
    store: &'a dyn LocationStore,
}

impl<'a> Env<'a> {
    pub fn new(
        players: &'a dyn PlayerDirectory,
        world: &'a dyn WorldOracle,
        messenger: &'a dyn Messenger,
        store: &'a dyn LocationStore,
    ) -> Self {
        Self {
            players,
            world,
            messenger,
            store,
        }
    }

    pub fn players(&self) -> &'a dyn PlayerDirectory {
        self.players
    }

    pub fn world(&self) -> &'a dyn WorldOracle {
        self.world
    }

    pub fn store(&self) -> &'a dyn LocationStore {
        self.store
    }

    pub fn notify(&self, notice: Notice) {
        self.messenger.notify(notice);
    }

    /// Display name for notices; falls back to the id for offline players.
    pub fn name_of(&self, id: crate::state::PlayerId) -> String {
        self.players
            .player(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}
