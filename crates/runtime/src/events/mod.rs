//! Events published by the simulation worker.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{CommandEvent, Event};
