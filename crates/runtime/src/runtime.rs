//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command and event
//! channels, and exposes a builder-based API for hosts.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use essentials_core::{Engine, EngineConfig, Env, LocationStore};

use crate::api::{BoxError, Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::repository::InMemoryLocationStore;
use crate::workers::SimulationWorker;
use crate::world::SimWorld;

/// Produces fresh engine settings for `/essentialsx reload`.
pub type SettingsSource =
    Box<dyn FnMut() -> std::result::Result<EngineConfig, BoxError> + Send>;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Wall-clock length of one tick. `None` means ticks only advance through
    /// [`RuntimeHandle::advance`].
    pub tick_interval: Option<Duration>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    /// Real-time clock matching the engine's tick rate.
    pub fn realtime(engine: EngineConfig) -> Self {
        let rate = engine.tick_rate_hz.max(1);
        Self {
            tick_interval: Some(Duration::from_micros(1_000_000 / rate)),
            engine,
            ..Self::default()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tick_interval: None,
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that owns the simulation worker.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Handle clones given out earlier may still be alive; they get
    /// [`RuntimeError::CommandChannelClosed`] afterwards. In-flight warmups
    /// and requests are discarded.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.stop().await;
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<SimWorld>,
    store: Option<Box<dyn LocationStore + Send>>,
    settings_source: Option<SettingsSource>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            store: None,
            settings_source: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine settings
    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Provide the simulated world (defaults to a flat world at y = 64)
    pub fn world(mut self, world: SimWorld) -> Self {
        self.world = Some(world);
        self
    }

    /// Set the location store (defaults to [`InMemoryLocationStore`])
    pub fn store(mut self, store: impl LocationStore + Send + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Where reloads read settings from. Without one, reloads fail with
    /// [`RuntimeError::ReloadUnavailable`].
    pub fn settings_source<F>(mut self, source: F) -> Self
    where
        F: FnMut() -> std::result::Result<EngineConfig, BoxError> + Send + 'static,
    {
        self.settings_source = Some(Box::new(source));
        self
    }

    /// Build the runtime and spawn the simulation worker.
    ///
    /// Persisted state (the custom spawn) is loaded before the worker starts.
    pub async fn build(self) -> Result<Runtime> {
        let RuntimeBuilder {
            config,
            world,
            store,
            settings_source,
        } = self;

        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let mut world = world.unwrap_or_default();
        world.attach_bus(event_bus.clone());
        let store = store.unwrap_or_else(|| Box::new(InMemoryLocationStore::new()));

        let mut engine = Engine::new(config.engine);
        engine
            .init(Env::new(&world, &world, &world, store.as_ref()))
            .map_err(RuntimeError::InitialState)?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        let worker = SimulationWorker::new(
            engine,
            world,
            store,
            config.tick_interval,
            command_rx,
            event_bus.clone(),
        )
        .with_settings_source(settings_source);
        let sim_worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            sim_worker_handle,
        })
    }
}
