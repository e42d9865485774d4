//! `spawn` and `setspawn`.
use crate::action::{ActionKind, ActionPlan, Destination};
use crate::command::Outcome;
use crate::engine::Engine;
use crate::env::{Env, MessageKey, Notice};
use crate::error::{ActionError, CommandError};
use crate::state::{Location, PlayerRef, Tick};

impl Engine {
    /// Custom spawn if one was set, else the world default.
    pub fn spawn_point(&self, env: Env<'_>) -> Option<Location> {
        self.custom_spawn.or_else(|| env.world().default_spawn())
    }

    pub(crate) fn go_spawn(
        &mut self,
        caller: &PlayerRef,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        self.enabled(ActionKind::Spawn)?;
        if self.warmups.is_busy(caller.id) {
            return Err(ActionError::AlreadyBusy);
        }
        let exempt = self.is_exempt(ActionKind::Spawn, caller, env);
        if !exempt {
            self.ensure_ready(ActionKind::Spawn, caller.id, now)?;
        }
        let target = self.spawn_point(env).ok_or(ActionError::NoDestination)?;

        let plan = ActionPlan::solo(ActionKind::Spawn, caller.id, Destination::Fixed(target))
            .exempt(exempt);
        self.launch(plan, now, env)
    }

    /// Stores the caller's current location as the server spawn.
    pub(crate) fn set_spawn(
        &mut self,
        caller: &PlayerRef,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        let role = env.players().role(caller.id);
        if !self.config.spawn.set_spawn.allows(caller, role.as_deref()) {
            return Err(ActionError::PermissionDenied.into());
        }
        let position = env
            .players()
            .position(caller.id)
            .ok_or_else(|| ActionError::ExecutionFailed("player is not in the world".into()))?;
        let location = Location {
            position,
            orientation: env.players().orientation(caller.id),
        };

        env.store().save_spawn(&location)?;
        self.custom_spawn = Some(location);

        tracing::info!(player = %caller, position = %position, "spawn updated");
        env.notify(
            Notice::new(caller.id, ActionKind::Spawn, MessageKey::SpawnSet)
                .with("position", position),
        );
        Ok(Outcome::SpawnSet(location))
    }
}
