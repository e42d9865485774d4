//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! simulating player activity, running chat commands and streaming events
//! from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use essentials_core::{Orientation, Outcome, PlayerId, Tick, Vec3};

use super::errors::{Result, RuntimeError};
use super::status::PlayerStatus;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Asks the worker to stop. A worker that already exited is fine.
    pub(crate) async fn stop(&self) {
        let _ = self.command_tx.send(Command::Shutdown).await;
    }

    /// Run a chat command such as `("tpa", "Steve")` for `player`.
    ///
    /// Engine rejections come back as [`RuntimeError::Command`]; the player
    /// has already been sent the matching notice.
    pub async fn dispatch(
        &self,
        player: PlayerId,
        verb: impl Into<String>,
        args: impl Into<String>,
    ) -> Result<Outcome> {
        let verb = verb.into();
        let args = args.into();
        self.request(|reply| Command::Dispatch {
            player,
            verb,
            args,
            reply,
        })
        .await?
    }

    /// Bring a player online at `position`.
    pub async fn join(
        &self,
        player: PlayerId,
        name: impl Into<String>,
        role: Option<&str>,
        position: Vec3,
    ) -> Result<PlayerStatus> {
        let name = name.into();
        let role = role.map(str::to_string);
        self.request(|reply| Command::Join {
            player,
            name,
            role,
            position,
            reply,
        })
        .await
    }

    /// Disconnect a player, tearing down their requests and warmups.
    pub async fn leave(&self, player: PlayerId) -> Result<()> {
        self.request(|reply| Command::Leave { player, reply }).await?
    }

    pub async fn move_player(&self, player: PlayerId, position: Vec3) -> Result<()> {
        self.request(|reply| Command::Move {
            player,
            position,
            orientation: None,
            reply,
        })
        .await?
    }

    pub async fn look(
        &self,
        player: PlayerId,
        position: Vec3,
        orientation: Orientation,
    ) -> Result<()> {
        self.request(|reply| Command::Move {
            player,
            position,
            orientation: Some(orientation),
            reply,
        })
        .await?
    }

    /// Hurt a player and return the remaining health.
    pub async fn damage(&self, player: PlayerId, amount: f64) -> Result<f64> {
        self.request(|reply| Command::Damage {
            player,
            amount,
            reply,
        })
        .await?
    }

    /// Kill a player: the death point is recorded and they respawn.
    pub async fn kill(&self, player: PlayerId) -> Result<()> {
        self.request(|reply| Command::Kill { player, reply }).await?
    }

    /// Advance the clock by `ticks` and return the new tick.
    ///
    /// Usable alongside a free-running clock, though tests normally build the
    /// runtime without one so time only moves here.
    pub async fn advance(&self, ticks: u64) -> Result<Tick> {
        self.request(|reply| Command::Advance { ticks, reply }).await
    }

    /// Reload settings from the runtime's settings source, as the console.
    pub async fn reload(&self) -> Result<()> {
        self.request(|reply| Command::Reload { reply }).await?
    }

    pub async fn now(&self) -> Result<Tick> {
        self.request(|reply| Command::QueryTick { reply }).await
    }

    /// Query a player's status, `None` for a player that never joined.
    pub async fn player(&self, player: PlayerId) -> Result<Option<PlayerStatus>> {
        self.request(|reply| Command::QueryPlayer { player, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Notices` - Messages addressed to players
    /// - `Topic::Commands` - Every dispatched chat command and its result
    /// - `Topic::Ticks` - Ticks that executed or canceled warmups
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use essentials_runtime::Topic;
    ///
    /// let mut notices = handle.subscribe(Topic::Notices);
    /// while let Ok(event) = notices.recv().await {
    ///     // Render the notice for its recipient
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
