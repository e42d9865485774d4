//! Deferred action engine.
//!
//! The [`Engine`] owns the three engine tables (cooldowns, pending requests,
//! warmup sessions) for the lifetime of a server run. The host calls it from a
//! single simulation thread: [`Engine::dispatch`] for chat commands,
//! [`Engine::tick`] once per clock tick, and the `on_*` hooks for player
//! events. Every entry point is synchronous; waiting is modelled by tasks the
//! warmup supervisor hands back on later ticks.

mod executor;
mod ledger;
mod negotiation;
mod registry;
mod scheduler;
mod warmup;

pub use executor::{SAFE_GROUND_SEARCH_DEPTH, execute};
pub use ledger::CooldownLedger;
pub use registry::{PendingRegistry, PendingRequest};
pub use scheduler::{Scheduler, TaskHandle};
pub use warmup::{
    CancelReason, Observation, SessionId, WarmupSession, WarmupStart, WarmupSupervisor,
    WatchFlags, WatchLimits,
};

use std::collections::BTreeMap;

use crate::action::{ActionKind, ActionPlan, FollowUp, Module};
use crate::command::{Command, Outcome};
use crate::config::{ActionSettings, EngineConfig};
use crate::env::{Env, MessageKey, Notice, StoreError};
use crate::error::{ActionError, CommandError};
use crate::state::{Location, PlayerId, PlayerRef, Tick};
use warmup::WarmupTask;

/// What one [`Engine::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub executed: usize,
    pub failed: usize,
    pub canceled: usize,
}

/// Deferred action and negotiation engine.
#[derive(Debug, Default)]
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) ledger: CooldownLedger,
    pub(crate) registry: PendingRegistry,
    pub(crate) warmups: WarmupSupervisor,
    pub(crate) death_points: BTreeMap<PlayerId, Location>,
    /// Tick of the last damage taken.
    pub(crate) last_damage: BTreeMap<PlayerId, Tick>,
    pub(crate) custom_spawn: Option<Location>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &CooldownLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }

    pub fn warmups(&self) -> &WarmupSupervisor {
        &self.warmups
    }

    pub fn custom_spawn(&self) -> Option<Location> {
        self.custom_spawn
    }

    /// Loads persisted state at server start.
    pub fn init(&mut self, env: Env<'_>) -> Result<(), StoreError> {
        self.custom_spawn = env.store().load_spawn()?;
        tracing::info!(custom_spawn = self.custom_spawn.is_some(), "engine initialized");
        Ok(())
    }

    /// Drops every in-flight request, warmup and cooldown (server stop).
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.registry.clear();
        self.warmups.clear();
        self.death_points.clear();
        self.last_damage.clear();
        tracing::debug!("engine reset");
    }

    /// Swaps in freshly loaded settings.
    ///
    /// Cooldowns already armed keep their ready-at tick. Warmups and
    /// requests of kinds the new settings disable are canceled.
    pub fn reconfigure(&mut self, config: EngineConfig, now: Tick, env: Env<'_>) {
        let disabled: Vec<ActionKind> = self
            .config
            .actions
            .keys()
            .copied()
            .filter(|kind| self.config.settings(*kind).is_some() && config.settings(*kind).is_none())
            .collect();
        self.config = config;

        for kind in disabled {
            let movers: Vec<PlayerId> = self
                .warmups
                .sessions()
                .filter(|s| s.plan.kind == kind)
                .map(|s| s.plan.mover)
                .collect();
            for mover in movers {
                self.abort(mover, CancelReason::Explicit, now, env);
            }

            let Some(negotiation) = kind.negotiation() else {
                continue;
            };
            let receivers: Vec<PlayerId> = self
                .registry
                .iter()
                .filter(|r| r.kind == negotiation)
                .map(|r| r.receiver)
                .collect();
            for receiver in receivers {
                if let Some(request) = self.registry.withdraw(negotiation, receiver) {
                    env.notify(
                        Notice::new(request.receiver, kind, MessageKey::RequestCanceled)
                            .with("player", env.name_of(request.sender)),
                    );
                    env.notify(Notice::new(request.sender, kind, MessageKey::Disabled));
                }
            }
            tracing::info!(kind = %kind, "module disabled by reload");
        }
        tracing::info!("settings reloaded");
    }

    /// Runs a chat command for `caller`.
    ///
    /// Errors are reported to the caller as notices before being returned.
    pub fn dispatch(
        &mut self,
        caller: PlayerId,
        command: &Command,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        self.sweep_expired(now, env);

        let Some(caller_ref) = env.players().player(caller) else {
            return Err(ActionError::ExecutionFailed(format!("player {caller} is offline")).into());
        };

        let result = match command {
            Command::SetHome { name } => self.set_home(&caller_ref, name, now, env),
            Command::DelHome { name } => self.delete_home(&caller_ref, name, env),
            Command::ListHomes => self.list_homes(&caller_ref, env),
            Command::Home { name } => self.go_home(&caller_ref, name.as_deref(), now, env),
            Command::Back => self.go_back(&caller_ref, now, env).map_err(Into::into),
            Command::Spawn => self.go_spawn(&caller_ref, now, env).map_err(Into::into),
            Command::SetSpawn => self.set_spawn(&caller_ref, env),
            Command::Request { kind, target } => self
                .request(*kind, &caller_ref, target, now, env)
                .map_err(Into::into),
            Command::Accept(kind) => self.accept(*kind, &caller_ref, now, env).map_err(Into::into),
            Command::Deny(kind) => self.deny(*kind, &caller_ref, now, env).map_err(Into::into),
            Command::Cancel(kind) => self.cancel(*kind, &caller_ref, now, env).map_err(Into::into),
            Command::Rules { page } => self.show_rules(&caller_ref, *page, env).map_err(Into::into),
            Command::Info => Ok(self.show_info(&caller_ref, env)),
            Command::Help { topic } => Ok(self.show_help(&caller_ref, topic.as_deref(), env)),
            Command::Reload => self.request_reload(&caller_ref, env).map_err(Into::into),
        };

        if let Err(err) = &result {
            tracing::debug!(player = %caller_ref, command = ?command, error = %err, "command rejected");
            report(caller, command.module(), err, env);
        }
        result
    }

    /// Advances warmups to `now`.
    ///
    /// Watch tasks run before expiry tasks, so a disturbance observed on the
    /// same tick a warmup would complete cancels it.
    pub fn tick(&mut self, now: Tick, env: Env<'_>) -> TickReport {
        let mut report = TickReport::default();
        let tasks = self.warmups.due(now);
        let limits = WatchLimits {
            move_tolerance: self.config.move_tolerance,
            damage_epsilon: self.config.damage_epsilon,
        };

        for task in &tasks {
            if let WarmupTask::Watch { mover, session } = *task {
                let observation = Observation {
                    position: env.players().position(mover),
                    health: env.players().health(mover),
                };
                if let Some(reason) = self.warmups.check(mover, session, observation, limits) {
                    if self.abort(mover, reason, now, env) {
                        report.canceled += 1;
                    }
                }
            }
        }

        for task in &tasks {
            if let WarmupTask::Expire { mover, session } = *task {
                let Some(finished) = self.warmups.complete(mover, session) else {
                    continue;
                };
                match self.finish(&finished.plan, now, env) {
                    Ok(_) => report.executed += 1,
                    Err(_) => report.failed += 1,
                }
            }
        }
        report
    }

    /// Tears down everything that references a departing player.
    ///
    /// Cooldowns, death points and combat tags are kept so reconnecting
    /// changes nothing.
    pub fn on_disconnect(&mut self, player: PlayerId, env: Env<'_>) {
        for mover in self.warmups.movers_involving(player) {
            let Some(session) = self.warmups.cancel(mover, CancelReason::Disconnected) else {
                continue;
            };
            let plan = &session.plan;
            for other in [Some(plan.mover), plan.other_party()].into_iter().flatten() {
                if other != player {
                    env.notify(
                        Notice::new(other, plan.kind, MessageKey::PartnerCanceled)
                            .with("player", env.name_of(player))
                            .with("reason", CancelReason::Disconnected),
                    );
                }
            }
        }

        for request in self.registry.remove_all_for(player) {
            let other = if request.sender == player {
                request.receiver
            } else {
                request.sender
            };
            env.notify(
                Notice::new(other, request.kind.action_kind(), MessageKey::RequestCanceled)
                    .with("player", env.name_of(player)),
            );
        }

        tracing::debug!(player = %player, "disconnect cleanup done");
    }

    /// Damage reported by the host outside a warmup.
    pub fn on_damaged(&mut self, player: PlayerId, now: Tick) {
        self.last_damage.insert(player, now);
    }

    /// True if any engine table or scheduled task still refers to `player`.
    pub fn references(&self, player: PlayerId) -> bool {
        self.registry.references(player) || self.warmups.references(player)
    }

    // ------------------------------------------------------------------
    // shared pipeline
    // ------------------------------------------------------------------

    pub(crate) fn enabled(&self, kind: ActionKind) -> Result<&ActionSettings, ActionError> {
        self.config.settings(kind).ok_or(ActionError::Disabled(kind.into()))
    }

    pub(crate) fn is_exempt(&self, kind: ActionKind, player: &PlayerRef, env: Env<'_>) -> bool {
        let Some(settings) = self.config.settings(kind) else {
            return false;
        };
        let role = env.players().role(player.id);
        settings.bypass.allows(player, role.as_deref())
    }

    pub(crate) fn ensure_ready(
        &self,
        kind: ActionKind,
        player: PlayerId,
        now: Tick,
    ) -> Result<(), ActionError> {
        match self.ledger.remaining(player, kind, now) {
            0 => Ok(()),
            ticks => Err(ActionError::OnCooldown {
                seconds_remaining: self.config.ticks_to_seconds_ceil(ticks),
            }),
        }
    }

    /// Seconds left on the player's combat tag, if tagged.
    pub(crate) fn combat_seconds(&self, player: PlayerId, now: Tick) -> Option<u64> {
        let window = self.config.homes.combat_tag_ticks;
        let hit = self.last_damage.get(&player)?;
        let elapsed = hit.until(now);
        (window > 0 && elapsed < window)
            .then(|| self.config.ticks_to_seconds_ceil(window - elapsed))
    }

    /// Starts the plan's warmup, or executes it right away when the warmup
    /// is zero or the requester is exempt.
    ///
    /// The busy check here is the single-flight claim for the mover.
    pub(crate) fn launch(
        &mut self,
        plan: ActionPlan,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let settings = self.enabled(plan.kind)?;
        let duration = if plan.exempt { 0 } else { settings.warmup_ticks };
        let watch = settings.watch;

        if self.warmups.is_busy(plan.mover) {
            return Err(ActionError::AlreadyBusy);
        }
        if duration == 0 {
            return self.finish(&plan, now, env).map(Outcome::Teleported);
        }

        let Some(start_position) = env.players().position(plan.mover) else {
            let err = ActionError::ExecutionFailed(format!("player {} is not in the world", plan.mover));
            self.notify_outcome(&plan, Err(&err), env);
            return Err(err);
        };
        let start = WarmupStart {
            start_position,
            start_health: env.players().health(plan.mover),
            watch,
            duration,
            watch_interval: self.config.watch_interval_ticks,
            plan,
        };
        let seconds = self.config.ticks_to_seconds_ceil(duration);
        let (mover, other, kind) = (start.plan.mover, start.plan.other_party(), start.plan.kind);
        self.warmups.begin(now, start)?;

        env.notify(
            Notice::new(mover, kind, MessageKey::WarmupStarted).with("seconds", seconds),
        );
        if let Some(other) = other {
            env.notify(
                Notice::new(other, kind, MessageKey::WarmupStarted)
                    .with("seconds", seconds)
                    .with("player", env.name_of(mover)),
            );
        }
        Ok(Outcome::WarmupStarted { ticks: duration })
    }

    /// Executes a plan whose warmup elapsed (or had none) and reports the
    /// result to both parties.
    pub(crate) fn finish(
        &mut self,
        plan: &ActionPlan,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Location, ActionError> {
        let result = match self.config.actions.get(&plan.kind) {
            Some(settings) => execute(plan, settings, now, &mut self.ledger, env),
            None => Err(ActionError::Disabled(plan.kind.into())),
        };
        self.notify_outcome(plan, result.as_ref().map(|_| ()), env);

        if let Ok(location) = &result {
            tracing::info!(
                kind = %plan.kind,
                mover = %env.name_of(plan.mover),
                destination = %location.position,
                "teleported"
            );
            if let FollowUp::MarkHomeUsed(name) = &plan.follow_up {
                self.mark_home_used(plan, name, env);
            }
        }
        result
    }

    /// Cancels the mover's warmup and tells everyone involved.
    pub(crate) fn abort(
        &mut self,
        mover: PlayerId,
        reason: CancelReason,
        now: Tick,
        env: Env<'_>,
    ) -> bool {
        let Some(session) = self.warmups.cancel(mover, reason) else {
            return false;
        };
        if reason == CancelReason::Damaged {
            self.last_damage.insert(mover, now);
        }
        let plan = &session.plan;
        env.notify(Notice::new(mover, plan.kind, reason.message()));
        if let Some(other) = plan.other_party() {
            env.notify(
                Notice::new(other, plan.kind, MessageKey::PartnerCanceled)
                    .with("player", env.name_of(mover))
                    .with("reason", reason),
            );
        }
        true
    }

    fn notify_outcome(&self, plan: &ActionPlan, result: Result<(), &ActionError>, env: Env<'_>) {
        let other = plan.other_party();
        match result {
            Ok(()) => {
                env.notify(Notice::new(plan.mover, plan.kind, MessageKey::Teleported));
                if let Some(other) = other {
                    env.notify(
                        Notice::new(other, plan.kind, MessageKey::PartnerTeleported)
                            .with("player", env.name_of(plan.mover)),
                    );
                }
            }
            Err(err) => {
                for recipient in [Some(plan.mover), other].into_iter().flatten() {
                    env.notify(
                        Notice::new(recipient, plan.kind, MessageKey::ExecutionFailed)
                            .with("reason", err),
                    );
                }
            }
        }
    }

    /// Removes expired requests and tells their senders.
    fn sweep_expired(&mut self, now: Tick, env: Env<'_>) {
        for request in self.registry.sweep_expired(now) {
            tracing::debug!(sender = %request.sender, receiver = %request.receiver, "request expired");
            env.notify(
                Notice::new(
                    request.sender,
                    request.kind.action_kind(),
                    MessageKey::RequestExpired,
                )
                .with("player", env.name_of(request.receiver)),
            );
        }
        self.ledger.prune(now);
    }
}

/// Sends the notice matching a rejected command.
///
/// Execution failures are reported where they happen, to both parties.
fn report(caller: PlayerId, module: Module, err: &CommandError, env: Env<'_>) {
    use crate::action::HomeError;

    let base = |key| Notice::new(caller, module, key);
    let notice = match err {
        CommandError::Action(action) => match action {
            ActionError::ExecutionFailed(_) => return,
            ActionError::AlreadyBusy => base(MessageKey::AlreadyBusy),
            ActionError::DuplicateSenderPending => base(MessageKey::DuplicatePending),
            ActionError::NothingPending => base(MessageKey::NothingPending),
            ActionError::NothingToCancel => base(MessageKey::NothingToCancel),
            ActionError::OnCooldown { seconds_remaining } => {
                base(MessageKey::OnCooldown).with("seconds", seconds_remaining)
            }
            ActionError::SelfTarget => base(MessageKey::SelfTarget),
            ActionError::TargetNotFound => base(MessageKey::TargetNotFound),
            ActionError::Disabled(_) => base(MessageKey::Disabled),
            ActionError::NoDestination => base(MessageKey::NoDestination),
            ActionError::PermissionDenied => base(MessageKey::PermissionDenied),
            ActionError::CombatTagged { seconds } => {
                base(MessageKey::CombatTagged).with("seconds", seconds)
            }
        },
        CommandError::Home(home) => match home {
            HomeError::InvalidName => base(MessageKey::InvalidName),
            HomeError::NameTooLong { max } => base(MessageKey::NameTooLong).with("max", max),
            HomeError::LimitReached { limit } => {
                base(MessageKey::LimitReached).with("count", limit)
            }
            HomeError::DuplicateName(name) => base(MessageKey::DuplicateName).with("name", name),
            HomeError::NoSuchHome(name) => base(MessageKey::NoSuchHome).with("name", name),
            HomeError::NotOnGround => base(MessageKey::NotOnGround),
            HomeError::InLiquid => base(MessageKey::InLiquid),
            HomeError::Storage(_) => base(MessageKey::StorageFailed),
        },
        CommandError::Storage(_) => base(MessageKey::StorageFailed),
    };
    env.notify(notice);
}
