use crate::state::{Location, PlayerId, Vec3};

use super::WorldError;

/// World mutation and geometry queries.
pub trait WorldOracle {
    /// Makes sure the region around `position` is loaded before a teleport.
    fn load_region(&self, position: Vec3) -> Result<(), WorldError>;

    /// Relocates the player. Orientation is applied when present.
    fn teleport(&self, player: PlayerId, destination: &Location) -> Result<(), WorldError>;

    fn default_spawn(&self) -> Option<Location>;

    /// A player fits at `position` (feet and head blocks are free).
    fn is_passable(&self, position: Vec3) -> bool;

    /// The block directly below `position` can be stood on.
    fn is_solid_ground_below(&self, position: Vec3) -> bool;

    fn is_liquid(&self, position: Vec3) -> bool;

    /// Walks down from `position` until it is passable with solid ground
    /// below, probing at most `max_steps` blocks.
    fn find_safe_ground(&self, position: Vec3, max_steps: u32) -> Option<Vec3> {
        let mut probe = position;
        for _ in 0..max_steps {
            if self.is_passable(probe) && self.is_solid_ground_below(probe) {
                return Some(probe);
            }
            probe = probe.offset_y(-1.0);
        }
        None
    }
}
