use essentials_core::{ActionKind, Location, NegotiationKind, PlayerId, Vec3};

/// Snapshot of one player as seen by the runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStatus {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<String>,
    pub online: bool,
    pub position: Vec3,
    pub health: f64,
    /// Verb whose warmup is currently moving this player.
    pub warmup: Option<ActionKind>,
    pub death_point: Option<Location>,
    /// Requests this player sent that are still waiting for an answer.
    pub outgoing: Vec<(NegotiationKind, PlayerId)>,
}

impl PlayerStatus {
    pub fn is_warming_up(&self) -> bool {
        self.warmup.is_some()
    }
}
