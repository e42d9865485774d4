//! Async host runtime for the essentials engine.
//!
//! This crate wires the synchronous [`essentials_core::Engine`] into a tokio
//! task that owns the engine, a simulated world and a location store. Clients
//! talk to it through the cloneable [`RuntimeHandle`] and observe notices and
//! tick reports on the [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`world`] is an in-memory world implementing the engine's oracles
//! - [`repository`] persists homes and the custom spawn
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;
pub mod world;

mod workers;

pub use api::{BoxError, PlayerStatus, Result, RuntimeError, RuntimeHandle};
pub use events::{CommandEvent, Event, EventBus, Topic};
pub use repository::{FileLocationStore, InMemoryLocationStore, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, SettingsSource};
pub use world::{SimPlayer, SimWorld};
