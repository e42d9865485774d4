//! Two-party request/accept protocol shared by TPA (push) and TPR (pull).
//!
//! Both flavours run the same state machine; only the direction decides
//! which party moves. Cooldown and bypass are always those of the sender.
use crate::action::{ActionPlan, Destination, Direction, FollowUp, NegotiationKind};
use crate::command::Outcome;
use crate::env::{Env, MessageKey, Notice};
use crate::error::ActionError;
use crate::state::{PlayerRef, Tick};

use super::{CancelReason, Engine};

impl Engine {
    /// Proposes a teleport from `caller` to the player named by `target`.
    pub fn request(
        &mut self,
        kind: NegotiationKind,
        caller: &PlayerRef,
        target: &str,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let action = kind.action_kind();
        let ttl = self.enabled(action)?.request_ttl_ticks;

        let receiver = env
            .players()
            .resolve(target)
            .ok_or(ActionError::TargetNotFound)?;
        if receiver.id == caller.id {
            return Err(ActionError::SelfTarget);
        }
        if !self.is_exempt(action, caller, env) {
            self.ensure_ready(action, caller.id, now)?;
        }

        let replaced = self
            .registry
            .propose(kind, caller.id, receiver.id, now, ttl)?;
        if let Some(old) = replaced {
            tracing::debug!(sender = %old.sender, receiver = %receiver, "pending request replaced");
            env.notify(
                Notice::new(old.sender, action, MessageKey::RequestCanceled)
                    .with("player", &receiver.name),
            );
        }
        tracing::debug!(kind = %kind, sender = %caller, receiver = %receiver, ttl, "request proposed");

        let seconds = self.config.ticks_to_seconds_ceil(ttl);
        env.notify(
            Notice::new(caller.id, action, MessageKey::RequestSent)
                .with("player", &receiver.name)
                .with("seconds", seconds),
        );
        env.notify(
            Notice::new(receiver.id, action, MessageKey::RequestReceived)
                .with("player", &caller.name)
                .with("seconds", seconds),
        );
        Ok(Outcome::Requested {
            receiver: receiver.id,
        })
    }

    /// Accepts the request waiting on `caller`.
    ///
    /// The mover is claimed through [`Engine::launch`] before the pending
    /// entry is released. The entry is released whether or not the claim
    /// succeeds, so a busy mover consumes the request.
    pub fn accept(
        &mut self,
        kind: NegotiationKind,
        caller: &PlayerRef,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let action = kind.action_kind();
        self.enabled(action)?;

        let request = self
            .registry
            .resolve(kind, caller.id, now)
            .ok_or(ActionError::NothingPending)?;
        let Some(sender) = env.players().player(request.sender) else {
            self.registry.withdraw(kind, caller.id);
            return Err(ActionError::NothingPending);
        };

        let (mover, destination) = match kind.direction() {
            Direction::Push => (sender.id, Destination::Player(caller.id)),
            Direction::Pull => (caller.id, Destination::Player(sender.id)),
        };
        let plan = ActionPlan {
            kind: action,
            mover,
            requester: sender.id,
            counterpart: Some(caller.id),
            destination,
            exempt: self.is_exempt(action, &sender, env),
            follow_up: FollowUp::None,
        };

        env.notify(
            Notice::new(sender.id, action, MessageKey::RequestAccepted)
                .with("player", &caller.name),
        );
        let claimed = self.launch(plan, now, env);
        self.registry.withdraw(kind, caller.id);
        tracing::debug!(kind = %kind, sender = %sender, receiver = %caller, ok = claimed.is_ok(), "request accepted");

        if matches!(claimed, Err(ActionError::AlreadyBusy)) {
            env.notify(Notice::new(sender.id, action, MessageKey::AlreadyBusy));
        }
        claimed
    }

    /// Denies the request waiting on `caller`.
    pub fn deny(
        &mut self,
        kind: NegotiationKind,
        caller: &PlayerRef,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let action = kind.action_kind();
        self.enabled(action)?;

        let request = self
            .registry
            .resolve(kind, caller.id, now)
            .ok_or(ActionError::NothingPending)?;
        self.registry.withdraw(kind, caller.id);
        tracing::debug!(kind = %kind, sender = %request.sender, receiver = %caller, "request denied");

        env.notify(
            Notice::new(request.sender, action, MessageKey::RequestDenied)
                .with("player", &caller.name),
        );
        env.notify(
            Notice::new(caller.id, action, MessageKey::DenyConfirmed)
                .with("player", env.name_of(request.sender)),
        );
        Ok(Outcome::Denied)
    }

    /// Cancels the caller's warmup of this kind, or else their outgoing
    /// request.
    pub fn cancel(
        &mut self,
        kind: NegotiationKind,
        caller: &PlayerRef,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let action = kind.action_kind();
        self.enabled(action)?;

        let mover = self
            .warmups
            .sessions()
            .find(|s| {
                s.plan.kind == action && (s.plan.mover == caller.id || s.plan.requester == caller.id)
            })
            .map(|s| s.plan.mover);
        if let Some(mover) = mover {
            if mover == caller.id {
                self.abort(mover, CancelReason::Explicit, now, env);
            } else if self.warmups.cancel(mover, CancelReason::Explicit).is_some() {
                tracing::debug!(kind = %kind, mover = %mover, requester = %caller, "warmup canceled by requester");
                env.notify(
                    Notice::new(mover, action, MessageKey::PartnerCanceled)
                        .with("player", &caller.name)
                        .with("reason", CancelReason::Explicit),
                );
                env.notify(
                    Notice::new(caller.id, action, MessageKey::CancelConfirmed)
                        .with("player", env.name_of(mover)),
                );
            }
            return Ok(Outcome::Canceled);
        }

        let Some(request) = self.registry.outgoing(kind, caller.id, now) else {
            return Err(ActionError::NothingToCancel);
        };
        self.registry.withdraw(kind, request.receiver);
        tracing::debug!(kind = %kind, sender = %caller, receiver = %request.receiver, "request withdrawn");

        env.notify(
            Notice::new(request.receiver, action, MessageKey::RequestCanceled)
                .with("player", &caller.name),
        );
        env.notify(
            Notice::new(caller.id, action, MessageKey::CancelConfirmed)
                .with("player", env.name_of(request.receiver)),
        );
        Ok(Outcome::Canceled)
    }
}

