//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the engine, the world and the location store
//! and is the only task that touches them.

mod simulation;

pub(crate) use simulation::{Command, SimulationWorker};
