use crate::state::{Orientation, PlayerId, PlayerRef, Vec3};

/// Live view of connected players.
///
/// Every query may answer "unknown" at any moment: a player can disconnect
/// between two calls. Callers treat `None` as a failure of the current
/// attempt.
pub trait PlayerDirectory {
    fn player(&self, id: PlayerId) -> Option<PlayerRef>;

    /// Online players in a stable order (join order for the simulated host).
    fn online_players(&self) -> Vec<PlayerRef>;

    fn position(&self, id: PlayerId) -> Option<Vec3>;

    fn orientation(&self, id: PlayerId) -> Option<Orientation> {
        let _ = id;
        None
    }

    fn health(&self, id: PlayerId) -> Option<f64>;

    /// Permission role, `None` when the player has no role assigned.
    fn role(&self, id: PlayerId) -> Option<String>;

    fn is_online(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Resolves a chat argument to an online player.
    ///
    /// Accepts `#<id>`, then an exact case-insensitive name, then the first
    /// player whose name starts with the argument. Ambiguous prefixes pick the
    /// first match in [`Self::online_players`] order.
    fn resolve(&self, name_or_id: &str) -> Option<PlayerRef> {
        let needle = name_or_id.trim();
        if needle.is_empty() {
            return None;
        }
        if let Some(id) = needle.strip_prefix('#').and_then(|raw| raw.parse::<u64>().ok()) {
            return self.player(PlayerId(id));
        }

        let online = self.online_players();
        if let Some(exact) = online.iter().find(|p| p.name.eq_ignore_ascii_case(needle)) {
            return Some(exact.clone());
        }
        let lowered = needle.to_ascii_lowercase();
        online
            .into_iter()
            .find(|p| p.name.to_ascii_lowercase().starts_with(&lowered))
    }
}
