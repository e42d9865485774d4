//! Warmup supervision: one cancelable countdown per mover.
//!
//! Each session owns two scheduler tasks: a periodic watch that compares the
//! mover's live position and health against the values captured at start,
//! and a one-shot expiry that completes the session. A session canceled after
//! its expiry was already drained for the current tick leaves a tombstone, so
//! the expiry is dropped even though the scheduler already handed it out.
use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;

use crate::action::ActionPlan;
use crate::env::MessageKey;
use crate::error::ActionError;
use crate::state::{PlayerId, Tick, Vec3};

use super::scheduler::{Scheduler, TaskHandle};

bitflags! {
    /// Disturbances that abort a warmup.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WatchFlags: u8 {
        const MOVE   = 1 << 0;
        const DAMAGE = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

/// Why a warmup ended without executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CancelReason {
    Moved,
    Damaged,
    Explicit,
    Disconnected,
}

impl CancelReason {
    /// Notice shown to the mover.
    pub const fn message(self) -> MessageKey {
        match self {
            Self::Moved => MessageKey::CanceledMoved,
            Self::Damaged => MessageKey::CanceledDamaged,
            Self::Explicit => MessageKey::CanceledExplicit,
            Self::Disconnected => MessageKey::CanceledDisconnected,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WarmupTask {
    Watch { mover: PlayerId, session: SessionId },
    Expire { mover: PlayerId, session: SessionId },
}

/// Live values read from the directory for one watch pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub position: Option<Vec3>,
    pub health: Option<f64>,
}

/// Thresholds applied by the watcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchLimits {
    pub move_tolerance: f64,
    pub damage_epsilon: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarmupSession {
    pub id: SessionId,
    pub plan: ActionPlan,
    pub start_position: Vec3,
    /// Health seen on the previous watch pass.
    pub last_health: Option<f64>,
    pub watch: WatchFlags,
    pub started_at: Tick,
    pub expires_at: Tick,
    watch_handle: TaskHandle,
    expiry_handle: TaskHandle,
}

/// Parameters captured when a warmup starts.
#[derive(Clone, Debug)]
pub struct WarmupStart {
    pub plan: ActionPlan,
    pub start_position: Vec3,
    pub start_health: Option<f64>,
    pub watch: WatchFlags,
    pub duration: u64,
    pub watch_interval: u64,
}

#[derive(Clone, Debug, Default)]
pub struct WarmupSupervisor {
    next_session: u64,
    sessions: BTreeMap<PlayerId, WarmupSession>,
    scheduler: Scheduler<WarmupTask>,
    canceled: BTreeSet<SessionId>,
}

impl WarmupSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, mover: PlayerId) -> bool {
        self.sessions.contains_key(&mover)
    }

    pub fn session(&self, mover: PlayerId) -> Option<&WarmupSession> {
        self.sessions.get(&mover)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &WarmupSession> {
        self.sessions.values()
    }

    /// Starts counting for the plan's mover.
    ///
    /// Fails with [`ActionError::AlreadyBusy`] if the mover already has a
    /// session; nothing is scheduled in that case.
    pub fn begin(&mut self, now: Tick, start: WarmupStart) -> Result<SessionId, ActionError> {
        let mover = start.plan.mover;
        if self.is_busy(mover) {
            return Err(ActionError::AlreadyBusy);
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;

        let watch_handle = self.scheduler.schedule_periodic(
            now,
            start.watch_interval,
            WarmupTask::Watch { mover, session: id },
        );
        let expiry_handle =
            self.scheduler
                .schedule(now, start.duration, WarmupTask::Expire { mover, session: id });

        tracing::debug!(
            mover = %mover,
            kind = %start.plan.kind,
            duration = start.duration,
            "warmup started"
        );

        self.sessions.insert(
            mover,
            WarmupSession {
                id,
                plan: start.plan,
                start_position: start.start_position,
                last_health: start.start_health,
                watch: start.watch,
                started_at: now,
                expires_at: now + start.duration,
                watch_handle,
                expiry_handle,
            },
        );
        Ok(id)
    }

    /// Cancels the mover's session, if any. Idempotent.
    pub fn cancel(&mut self, mover: PlayerId, reason: CancelReason) -> Option<WarmupSession> {
        let session = self.sessions.remove(&mover)?;
        self.scheduler.cancel(session.watch_handle);
        if !self.scheduler.cancel(session.expiry_handle) {
            self.canceled.insert(session.id);
        }
        tracing::debug!(mover = %mover, kind = %session.plan.kind, reason = %reason, "warmup canceled");
        Some(session)
    }

    /// Drains tasks due at `now`.
    pub(crate) fn due(&mut self, now: Tick) -> Vec<WarmupTask> {
        self.scheduler
            .due(now)
            .into_iter()
            .map(|(_, task)| task)
            .collect()
    }

    /// Runs one watch pass. Returns the reason to cancel, if the mover was
    /// disturbed. The health baseline moves to the observed value otherwise.
    pub fn check(
        &mut self,
        mover: PlayerId,
        session: SessionId,
        observation: Observation,
        limits: WatchLimits,
    ) -> Option<CancelReason> {
        let live = self.sessions.get_mut(&mover).filter(|s| s.id == session)?;

        let Some(position) = observation.position else {
            return Some(CancelReason::Disconnected);
        };
        if live.watch.contains(WatchFlags::MOVE)
            && position.distance(&live.start_position) > limits.move_tolerance
        {
            return Some(CancelReason::Moved);
        }
        if live.watch.contains(WatchFlags::DAMAGE) {
            if let (Some(last), Some(current)) = (live.last_health, observation.health) {
                if current < last - limits.damage_epsilon {
                    return Some(CancelReason::Damaged);
                }
            }
        }
        if observation.health.is_some() {
            live.last_health = observation.health;
        }
        None
    }

    /// Finishes a session whose expiry fired. Returns `None` when the
    /// session was canceled in the meantime.
    pub fn complete(&mut self, mover: PlayerId, session: SessionId) -> Option<WarmupSession> {
        if self.canceled.remove(&session) {
            return None;
        }
        if self.sessions.get(&mover).is_none_or(|s| s.id != session) {
            return None;
        }
        let finished = self.sessions.remove(&mover)?;
        self.scheduler.cancel(finished.watch_handle);
        Some(finished)
    }

    /// Movers of every session `player` takes part in.
    pub fn movers_involving(&self, player: PlayerId) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|s| s.plan.involves(player))
            .map(|s| s.plan.mover)
            .collect()
    }

    pub fn references(&self, player: PlayerId) -> bool {
        !self.movers_involving(player).is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Scheduled watch and expiry tasks.
    pub fn scheduled_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.scheduler.clear();
        self.canceled.clear();
    }
}
