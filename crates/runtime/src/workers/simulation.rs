//! Simulation worker that owns the authoritative [`essentials_core::Engine`].
//!
//! Receives commands from [`crate::RuntimeHandle`], feeds them to the engine
//! on a single task and publishes [`Event`]s. Handling is synchronous so the
//! engine's borrowed [`Env`] never lives across an await point.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use essentials_core::{
    Command as ChatCommand, Engine, Env, LocationStore, MessageKey, Messenger, Module, Notice,
    Orientation, Outcome, PlayerId, Tick, TickReport, Vec3, WorldOracle,
};

use crate::api::{PlayerStatus, Result, RuntimeError};
use crate::runtime::SettingsSource;
use crate::events::{CommandEvent, Event, EventBus};
use crate::world::{SimPlayer, SimWorld};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Run a chat command for `player`.
    Dispatch {
        player: PlayerId,
        verb: String,
        args: String,
        reply: oneshot::Sender<Result<Outcome>>,
    },
    Join {
        player: PlayerId,
        name: String,
        role: Option<String>,
        position: Vec3,
        reply: oneshot::Sender<PlayerStatus>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    Move {
        player: PlayerId,
        position: Vec3,
        orientation: Option<Orientation>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Hurt a player; reaching zero health kills them.
    Damage {
        player: PlayerId,
        amount: f64,
        reply: oneshot::Sender<Result<f64>>,
    },
    Kill {
        player: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Advance the clock by `ticks`, running the engine once per tick.
    Advance {
        ticks: u64,
        reply: oneshot::Sender<Tick>,
    },
    QueryPlayer {
        player: PlayerId,
        reply: oneshot::Sender<Option<PlayerStatus>>,
    },
    QueryTick {
        reply: oneshot::Sender<Tick>,
    },
    /// Reload settings on behalf of the console.
    Reload {
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stop the worker even while handle clones are still alive.
    Shutdown,
}

/// Background task that processes host and chat commands.
pub struct SimulationWorker {
    engine: Engine,
    world: SimWorld,
    store: Box<dyn LocationStore + Send>,
    now: Tick,
    tick_interval: Option<Duration>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    settings_source: Option<SettingsSource>,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        engine: Engine,
        world: SimWorld,
        store: Box<dyn LocationStore + Send>,
        tick_interval: Option<Duration>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            engine,
            world,
            store,
            now: Tick::ZERO,
            tick_interval,
            command_rx,
            event_bus,
            settings_source: None,
        }
    }

    pub fn with_settings_source(mut self, source: Option<SettingsSource>) -> Self {
        self.settings_source = source;
        self
    }

    /// Main worker loop.
    ///
    /// With a tick interval the clock advances on its own; without one the
    /// clock only moves on [`Command::Advance`]. The loop ends on
    /// [`Command::Shutdown`] or once every handle has been dropped.
    pub async fn run(mut self) {
        info!(
            target: "runtime::worker",
            interval = ?self.tick_interval,
            "simulation worker started"
        );

        match self.tick_interval {
            Some(period) => {
                let mut clock = tokio::time::interval(period);
                clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        maybe_cmd = self.command_rx.recv() => match maybe_cmd {
                            Some(cmd) => {
                                if self.handle_command(cmd).is_break() {
                                    break;
                                }
                            }
                            None => break,
                        },
                        _ = clock.tick() => self.step(),
                    }
                }
            }
            None => {
                while let Some(cmd) = self.command_rx.recv().await {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
            }
        }

        self.engine.reset();
        info!(target: "runtime::worker", tick = %self.now, "simulation worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Dispatch {
                player,
                verb,
                args,
                reply,
            } => {
                let result = self.dispatch(player, &verb, &args);
                let _ = reply.send(result);
            }
            Command::Join {
                player,
                name,
                role,
                position,
                reply,
            } => {
                let joined = self.world.join(player, name, role, position);
                debug!(target: "runtime::worker", player = %player, "player joined");
                let _ = reply.send(self.status_of(joined));
            }
            Command::Leave { player, reply } => {
                let result = self.leave(player);
                let _ = reply.send(result);
            }
            Command::Move {
                player,
                position,
                orientation,
                reply,
            } => {
                let mut moved = self.world.move_player(player, position);
                if let Some(orientation) = orientation {
                    moved &= self.world.look(player, orientation);
                }
                let _ = reply.send(if moved {
                    Ok(())
                } else {
                    Err(RuntimeError::UnknownPlayer(player))
                });
            }
            Command::Damage {
                player,
                amount,
                reply,
            } => {
                let result = self.damage(player, amount);
                let _ = reply.send(result);
            }
            Command::Kill { player, reply } => {
                let result = self.kill(player);
                let _ = reply.send(result);
            }
            Command::Advance { ticks, reply } => {
                for _ in 0..ticks {
                    self.step();
                }
                let _ = reply.send(self.now);
            }
            Command::QueryPlayer { player, reply } => {
                let _ = reply.send(self.status(player));
            }
            Command::QueryTick { reply } => {
                let _ = reply.send(self.now);
            }
            Command::Reload { reply } => {
                let _ = reply.send(self.reload(None));
            }
            Command::Shutdown => {
                info!(target: "runtime::worker", "shutdown command received");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Moves the clock forward one tick and lets the engine run due warmups.
    fn step(&mut self) {
        self.now = self.now + 1;
        let now = self.now;
        let report = {
            let env = env(&self.world, self.store.as_ref());
            self.engine.tick(now, env)
        };
        if report != TickReport::default() {
            debug!(
                target: "runtime::worker",
                tick = %now,
                executed = report.executed,
                failed = report.failed,
                canceled = report.canceled,
                "warmups resolved"
            );
            self.event_bus.publish(Event::Tick { tick: now, report });
        }
    }

    fn dispatch(&mut self, player: PlayerId, verb: &str, args: &str) -> Result<Outcome> {
        let command = match ChatCommand::parse(verb, args) {
            Ok(command) => command,
            Err(err) => {
                if let Some(notice) = err.notice(player) {
                    self.world.notify(notice);
                }
                return Err(err.into());
            }
        };
        let now = self.now;
        let result = {
            let env = env(&self.world, self.store.as_ref());
            self.engine.dispatch(player, &command, now, env)
        };
        let result = match result {
            Ok(Outcome::ReloadRequested) => self
                .reload(Some(player))
                .map(|()| Outcome::ReloadRequested),
            other => other.map_err(RuntimeError::from),
        };

        self.event_bus.publish(Event::Command(CommandEvent {
            player,
            verb: verb.trim_start_matches('/').to_ascii_lowercase(),
            tick: now,
            result: result.as_ref().cloned().map_err(|e| e.to_string()),
        }));
        result
    }

    /// Swaps in settings from the source. `requested_by` hears the result.
    ///
    /// The tick rate is fixed for the life of the worker; a file that changes
    /// it is rejected and the old settings stay.
    fn reload(&mut self, requested_by: Option<PlayerId>) -> Result<()> {
        let loaded = match self.settings_source.as_mut() {
            Some(source) => source().map_err(RuntimeError::Reload),
            None => Err(RuntimeError::ReloadUnavailable),
        };
        let current = self.engine.config().tick_rate_hz;
        let checked = loaded.and_then(|config| {
            if config.tick_rate_hz == current {
                Ok(config)
            } else {
                Err(RuntimeError::TickRateChanged {
                    from: current,
                    to: config.tick_rate_hz,
                })
            }
        });

        match checked {
            Ok(config) => {
                let now = self.now;
                {
                    let env = env(&self.world, self.store.as_ref());
                    self.engine.reconfigure(config, now, env);
                }
                self.tell(requested_by, MessageKey::Reloaded);
                Ok(())
            }
            Err(err) => {
                warn!(target: "runtime::worker", error = %err, "settings reload failed");
                self.tell(requested_by, MessageKey::ReloadFailed);
                Err(err)
            }
        }
    }

    fn tell(&self, player: Option<PlayerId>, key: MessageKey) {
        if let Some(player) = player {
            self.world.notify(Notice::new(player, Module::Info, key));
        }
    }

    fn leave(&mut self, player: PlayerId) -> Result<()> {
        if self.world.get(player).is_none_or(|p| !p.online) {
            return Err(RuntimeError::UnknownPlayer(player));
        }
        // Cleanup needs the player still online so partners see their name.
        {
            let env = env(&self.world, self.store.as_ref());
            self.engine.on_disconnect(player, env);
        }
        self.world.leave(player);
        debug!(target: "runtime::worker", player = %player, "player left");
        Ok(())
    }

    fn damage(&mut self, player: PlayerId, amount: f64) -> Result<f64> {
        let health = self
            .world
            .damage(player, amount)
            .ok_or(RuntimeError::UnknownPlayer(player))?;
        self.engine.on_damaged(player, self.now);
        if health <= 0.0 {
            self.kill(player)?;
        }
        Ok(health)
    }

    /// Records the death point and respawns the player.
    fn kill(&mut self, player: PlayerId) -> Result<()> {
        let position = self
            .world
            .get(player)
            .filter(|p| p.online)
            .map(|p| p.position)
            .ok_or(RuntimeError::UnknownPlayer(player))?;

        {
            let env = env(&self.world, self.store.as_ref());
            self.engine.on_death(player, position, env);
        }

        let spawn = self
            .engine
            .custom_spawn()
            .or_else(|| self.world.default_spawn());
        match spawn {
            Some(spawn) => {
                self.world.respawn(player, spawn);
            }
            None => warn!(target: "runtime::worker", player = %player, "no spawn point to respawn at"),
        }
        Ok(())
    }

    fn status(&self, player: PlayerId) -> Option<PlayerStatus> {
        self.world.get(player).map(|sim| self.status_of(sim))
    }

    fn status_of(&self, sim: SimPlayer) -> PlayerStatus {
        let outgoing = self
            .engine
            .registry()
            .iter()
            .filter(|r| r.sender == sim.id)
            .map(|r| (r.kind, r.receiver))
            .collect();
        PlayerStatus {
            id: sim.id,
            warmup: self.engine.warmups().session(sim.id).map(|s| s.plan.kind),
            death_point: self.engine.death_point(sim.id),
            outgoing,
            name: sim.name,
            role: sim.role,
            online: sim.online,
            position: sim.position,
            health: sim.health,
        }
    }
}

fn env<'a>(world: &'a SimWorld, store: &'a dyn LocationStore) -> Env<'a> {
    Env::new(world, world, world, store)
}
