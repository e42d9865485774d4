//! In-memory world that stands in for a real game server.
//!
//! The world is a flat plane: everything below `ground_y` is solid, the air
//! above it is free, and selected `(x, z)` columns are flooded. It is owned
//! by the simulation worker, so no locking is needed; the player table sits
//! in a `RefCell` because the engine relocates players through `&self`.
use std::cell::RefCell;
use std::collections::BTreeSet;

use essentials_core::{
    Location, Messenger, Notice, Orientation, PlayerDirectory, PlayerId, PlayerRef, Vec3,
    WorldError, WorldOracle,
};

use crate::events::{Event, EventBus};

/// Health of a freshly joined or respawned player.
pub const MAX_HEALTH: f64 = 20.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SimPlayer {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<String>,
    pub position: Vec3,
    pub orientation: Orientation,
    pub health: f64,
    pub online: bool,
}

/// Simulated world implementing the engine's player, world and messenger
/// oracles.
#[derive(Debug)]
pub struct SimWorld {
    /// Join order is kept so name prefixes resolve deterministically.
    players: RefCell<Vec<SimPlayer>>,
    ground_y: f64,
    liquid: BTreeSet<(i64, i64)>,
    default_spawn: Option<Location>,
    /// Regions outside this radius around the origin fail to load.
    border: Option<f64>,
    bus: EventBus,
}

impl SimWorld {
    pub fn new(ground_y: f64) -> Self {
        Self {
            players: RefCell::new(Vec::new()),
            ground_y,
            liquid: BTreeSet::new(),
            default_spawn: Some(Location::at(Vec3::new(0.5, ground_y, 0.5))),
            border: None,
            bus: EventBus::new(),
        }
    }

    #[must_use]
    pub fn with_default_spawn(mut self, spawn: Option<Location>) -> Self {
        self.default_spawn = spawn;
        self
    }

    #[must_use]
    pub fn with_border(mut self, radius: f64) -> Self {
        self.border = Some(radius);
        self
    }

    #[must_use]
    pub fn with_liquid_column(mut self, x: i64, z: i64) -> Self {
        self.liquid.insert((x, z));
        self
    }

    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    pub(crate) fn attach_bus(&mut self, bus: EventBus) {
        self.bus = bus;
    }

    /// Brings a player online, reusing the record of a returning player.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        role: Option<String>,
        position: Vec3,
    ) -> SimPlayer {
        let name = name.into();
        let players = self.players.get_mut();
        match players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.name = name;
                player.role = role;
                player.position = position;
                player.online = true;
                player.clone()
            }
            None => {
                let player = SimPlayer {
                    id,
                    name,
                    role,
                    position,
                    orientation: Orientation::default(),
                    health: MAX_HEALTH,
                    online: true,
                };
                players.push(player.clone());
                player
            }
        }
    }

    /// Marks the player offline. Returns false if they were not online.
    pub fn leave(&mut self, id: PlayerId) -> bool {
        match self.online_mut(id) {
            Some(player) => {
                player.online = false;
                true
            }
            None => false,
        }
    }

    pub fn move_player(&mut self, id: PlayerId, position: Vec3) -> bool {
        match self.online_mut(id) {
            Some(player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    pub fn look(&mut self, id: PlayerId, orientation: Orientation) -> bool {
        match self.online_mut(id) {
            Some(player) => {
                player.orientation = orientation;
                true
            }
            None => false,
        }
    }

    /// Applies damage and returns the remaining health.
    pub fn damage(&mut self, id: PlayerId, amount: f64) -> Option<f64> {
        let player = self.online_mut(id)?;
        player.health = (player.health - amount.max(0.0)).max(0.0);
        Some(player.health)
    }

    /// Puts a dead player back at `location` with full health.
    pub fn respawn(&mut self, id: PlayerId, location: Location) -> bool {
        match self.online_mut(id) {
            Some(player) => {
                player.position = location.position;
                if let Some(orientation) = location.orientation {
                    player.orientation = orientation;
                }
                player.health = MAX_HEALTH;
                true
            }
            None => false,
        }
    }

    /// Any known player, online or not.
    pub fn get(&self, id: PlayerId) -> Option<SimPlayer> {
        self.players.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub fn players(&self) -> Vec<SimPlayer> {
        self.players.borrow().clone()
    }

    fn online(&self, id: PlayerId) -> Option<SimPlayer> {
        self.players
            .borrow()
            .iter()
            .find(|p| p.id == id && p.online)
            .cloned()
    }

    fn online_mut(&mut self, id: PlayerId) -> Option<&mut SimPlayer> {
        self.players
            .get_mut()
            .iter_mut()
            .find(|p| p.id == id && p.online)
    }

    fn column(position: Vec3) -> (i64, i64) {
        (position.x.floor() as i64, position.z.floor() as i64)
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl PlayerDirectory for SimWorld {
    fn player(&self, id: PlayerId) -> Option<PlayerRef> {
        self.online(id).map(|p| PlayerRef::new(p.id, p.name))
    }

    fn online_players(&self) -> Vec<PlayerRef> {
        self.players
            .borrow()
            .iter()
            .filter(|p| p.online)
            .map(|p| PlayerRef::new(p.id, p.name.clone()))
            .collect()
    }

    fn position(&self, id: PlayerId) -> Option<Vec3> {
        self.online(id).map(|p| p.position)
    }

    fn orientation(&self, id: PlayerId) -> Option<Orientation> {
        self.online(id).map(|p| p.orientation)
    }

    fn health(&self, id: PlayerId) -> Option<f64> {
        self.online(id).map(|p| p.health)
    }

    fn role(&self, id: PlayerId) -> Option<String> {
        self.online(id).and_then(|p| p.role)
    }
}

impl WorldOracle for SimWorld {
    fn load_region(&self, position: Vec3) -> Result<(), WorldError> {
        if let Some(radius) = self.border {
            let horizontal = Vec3::new(position.x, 0.0, position.z);
            if horizontal.distance(&Vec3::ORIGIN) > radius {
                return Err(WorldError::RegionUnavailable(format!(
                    "{position} is outside the world border"
                )));
            }
        }
        Ok(())
    }

    fn teleport(&self, player: PlayerId, destination: &Location) -> Result<(), WorldError> {
        self.load_region(destination.position)?;
        let mut players = self.players.borrow_mut();
        let Some(moved) = players.iter_mut().find(|p| p.id == player && p.online) else {
            return Err(WorldError::PlayerGone(player));
        };
        moved.position = destination.position;
        if let Some(orientation) = destination.orientation {
            moved.orientation = orientation;
        }
        tracing::debug!(player = %player, destination = %destination.position, "player relocated");
        Ok(())
    }

    fn default_spawn(&self) -> Option<Location> {
        self.default_spawn
    }

    fn is_passable(&self, position: Vec3) -> bool {
        position.y >= self.ground_y
    }

    fn is_solid_ground_below(&self, position: Vec3) -> bool {
        position.y >= self.ground_y && position.y < self.ground_y + 1.0
    }

    fn is_liquid(&self, position: Vec3) -> bool {
        self.liquid.contains(&Self::column(position))
    }
}

impl Messenger for SimWorld {
    fn notify(&self, notice: Notice) {
        tracing::trace!(recipient = %notice.recipient, key = %notice.key, "notice");
        self.bus.publish(Event::Notice(notice));
    }
}
