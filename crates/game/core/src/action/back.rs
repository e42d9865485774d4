//! `back`: return to the last death point.
use crate::action::{ActionKind, ActionPlan, Destination};
use crate::command::Outcome;
use crate::engine::Engine;
use crate::env::{Env, MessageKey, Notice};
use crate::error::ActionError;
use crate::state::{Location, PlayerId, PlayerRef, Tick, Vec3};

impl Engine {
    /// Records where `player` died so `back` can return there.
    pub fn on_death(&mut self, player: PlayerId, position: Vec3, env: Env<'_>) {
        if self.config.settings(ActionKind::Back).is_none() {
            return;
        }
        self.death_points.insert(player, Location::at(position));
        tracing::debug!(player = %player, position = %position, "death point recorded");
        env.notify(
            Notice::new(player, ActionKind::Back, MessageKey::DeathSaved).with("position", position),
        );
    }

    pub fn death_point(&self, player: PlayerId) -> Option<Location> {
        self.death_points.get(&player).copied()
    }

    pub(crate) fn go_back(
        &mut self,
        caller: &PlayerRef,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        self.enabled(ActionKind::Back)?;
        if self.warmups.is_busy(caller.id) {
            return Err(ActionError::AlreadyBusy);
        }
        let exempt = self.is_exempt(ActionKind::Back, caller, env);
        if !exempt {
            self.ensure_ready(ActionKind::Back, caller.id, now)?;
        }
        let target = self
            .death_points
            .get(&caller.id)
            .copied()
            .ok_or(ActionError::NoDestination)?;

        let plan = ActionPlan::solo(ActionKind::Back, caller.id, Destination::Fixed(target))
            .exempt(exempt);
        self.launch(plan, now, env)
    }
}
