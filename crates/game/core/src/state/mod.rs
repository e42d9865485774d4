//! Value types shared by every engine component.
//!
//! Players are referenced by [`PlayerId`]; positions, health and names stay
//! owned by the host and are re-read through the oracles at each decision
//! point instead of being cached here.
mod common;

pub use common::{Location, Orientation, PlayerId, PlayerRef, Tick, Vec3};
