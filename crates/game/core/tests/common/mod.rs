//! In-memory host used by the scenario tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use essentials_core::{
    ActionSettings, Command, CommandError, Engine, EngineConfig, Env, Location, LocationStore,
    MessageKey, Messenger, Notice, Orientation, Outcome, PlayerDirectory, PlayerHomes, PlayerId,
    PlayerRef, StoreError, Tick, Vec3, WatchFlags, WorldError, WorldOracle,
};

/// Flat world: solid ground up to y = 64, open air above.
pub const GROUND_Y: f64 = 64.0;

#[derive(Clone, Debug)]
pub struct FakePlayer {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<String>,
    pub position: Vec3,
    pub health: f64,
    pub online: bool,
}

#[derive(Default)]
pub struct FakeServer {
    players: RefCell<Vec<FakePlayer>>,
    notices: RefCell<Vec<Notice>>,
    homes: RefCell<BTreeMap<PlayerId, PlayerHomes>>,
    spawn: RefCell<Option<Location>>,
    teleports: RefCell<Vec<(PlayerId, Location)>>,
    pub default_spawn: Cell<Option<Location>>,
    pub liquid: Cell<bool>,
    pub reject_teleports: Cell<bool>,
}

impl FakeServer {
    pub fn new() -> Self {
        let server = Self::default();
        server
            .default_spawn
            .set(Some(Location::at(Vec3::new(0.0, GROUND_Y, 0.0))));
        server
    }

    pub fn env(&self) -> Env<'_> {
        Env::new(self, self, self, self)
    }

    /// Adds an online player standing on the ground at `(x, 64, z)`.
    pub fn join(&self, id: u64, name: &str, role: Option<&str>) -> PlayerId {
        let id = PlayerId(id);
        self.players.borrow_mut().push(FakePlayer {
            id,
            name: name.to_string(),
            role: role.map(str::to_string),
            position: Vec3::new(id.0 as f64 * 100.0, GROUND_Y, 0.0),
            health: 20.0,
            online: true,
        });
        id
    }

    pub fn leave(&self, id: PlayerId) {
        self.with_player(id, |p| p.online = false);
    }

    pub fn move_to(&self, id: PlayerId, position: Vec3) {
        self.with_player(id, |p| p.position = position);
    }

    pub fn set_health(&self, id: PlayerId, health: f64) {
        self.with_player(id, |p| p.health = health);
    }

    pub fn position_of(&self, id: PlayerId) -> Vec3 {
        self.players
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.position)
            .expect("unknown player")
    }

    pub fn teleports(&self) -> Vec<(PlayerId, Location)> {
        self.teleports.borrow().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Message keys delivered to `id`, in order.
    pub fn keys_for(&self, id: PlayerId) -> Vec<MessageKey> {
        self.notices
            .borrow()
            .iter()
            .filter(|n| n.recipient == id)
            .map(|n| n.key)
            .collect()
    }

    pub fn clear_notices(&self) {
        self.notices.borrow_mut().clear();
    }

    pub fn homes_of(&self, id: PlayerId) -> PlayerHomes {
        self.homes.borrow().get(&id).cloned().unwrap_or_default()
    }

    pub fn saved_spawn(&self) -> Option<Location> {
        *self.spawn.borrow()
    }

    fn with_player(&self, id: PlayerId, f: impl FnOnce(&mut FakePlayer)) {
        if let Some(player) = self.players.borrow_mut().iter_mut().find(|p| p.id == id) {
            f(player);
        }
    }

    fn online(&self, id: PlayerId) -> Option<FakePlayer> {
        self.players
            .borrow()
            .iter()
            .find(|p| p.id == id && p.online)
            .cloned()
    }
}

impl PlayerDirectory for FakeServer {
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
        self.online(id).map(|_| Orientation::new(90.0, 0.0))
    }

    fn health(&self, id: PlayerId) -> Option<f64> {
        self.online(id).map(|p| p.health)
    }

    fn role(&self, id: PlayerId) -> Option<String> {
        self.online(id).and_then(|p| p.role)
    }
}

impl WorldOracle for FakeServer {
    fn load_region(&self, _position: Vec3) -> Result<(), WorldError> {
        Ok(())
    }

    fn teleport(&self, player: PlayerId, destination: &Location) -> Result<(), WorldError> {
        if self.reject_teleports.get() {
            return Err(WorldError::Rejected("test world refuses".into()));
        }
        if self.online(player).is_none() {
            return Err(WorldError::PlayerGone(player));
        }
        self.move_to(player, destination.position);
        self.teleports.borrow_mut().push((player, *destination));
        Ok(())
    }

    fn default_spawn(&self) -> Option<Location> {
        self.default_spawn.get()
    }

    fn is_passable(&self, position: Vec3) -> bool {
        position.y >= GROUND_Y
    }

    fn is_solid_ground_below(&self, position: Vec3) -> bool {
        position.y >= GROUND_Y && position.y < GROUND_Y + 1.0
    }

    fn is_liquid(&self, _position: Vec3) -> bool {
        self.liquid.get()
    }
}

impl Messenger for FakeServer {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

impl LocationStore for FakeServer {
    fn load_homes(&self, player: PlayerId) -> Result<PlayerHomes, StoreError> {
        Ok(self.homes_of(player))
    }

    fn save_homes(&self, player: PlayerId, homes: &PlayerHomes) -> Result<(), StoreError> {
        self.homes.borrow_mut().insert(player, homes.clone());
        Ok(())
    }

    fn load_spawn(&self) -> Result<Option<Location>, StoreError> {
        Ok(*self.spawn.borrow())
    }

    fn save_spawn(&self, spawn: &Location) -> Result<(), StoreError> {
        *self.spawn.borrow_mut() = Some(*spawn);
        Ok(())
    }
}

/// Default config with every kind's warmup, cooldown and TTL set in ticks.
pub fn config(warmup: u64, cooldown: u64, ttl: u64) -> EngineConfig {
    let mut config = EngineConfig::default();
    for settings in config.actions.values_mut() {
        *settings = ActionSettings {
            warmup_ticks: warmup,
            cooldown_ticks: cooldown,
            request_ttl_ticks: ttl,
            watch: WatchFlags::MOVE | WatchFlags::DAMAGE,
            safe_teleport: false,
            ..settings.clone()
        };
    }
    config
}

pub fn run(
    engine: &mut Engine,
    server: &FakeServer,
    caller: PlayerId,
    verb: &str,
    arg: &str,
    now: u64,
) -> Result<Outcome, CommandError> {
    let command = Command::parse(verb, arg).expect("command should parse");
    engine.dispatch(caller, &command, Tick(now), server.env())
}

/// Ticks the engine through `from..=to`.
pub fn advance(engine: &mut Engine, server: &FakeServer, from: u64, to: u64) {
    for t in from..=to {
        engine.tick(Tick(t), server.env());
    }
}
