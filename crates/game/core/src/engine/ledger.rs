use std::collections::BTreeMap;

use crate::action::ActionKind;
use crate::state::{PlayerId, Tick};

/// Per-player, per-kind "ready at" ticks.
///
/// Entries are only ever written after a successful action. Stale entries are
/// harmless: a `ready_at` in the past reads as ready.
#[derive(Clone, Debug, Default)]
pub struct CooldownLedger {
    ready_at: BTreeMap<(PlayerId, ActionKind), Tick>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown players are ready.
    pub fn is_ready(&self, player: PlayerId, kind: ActionKind, now: Tick) -> bool {
        self.remaining(player, kind, now) == 0
    }

    /// Ticks left before `player` may use `kind` again.
    pub fn remaining(&self, player: PlayerId, kind: ActionKind, now: Tick) -> u64 {
        self.ready_at
            .get(&(player, kind))
            .map_or(0, |ready_at| now.until(*ready_at))
    }

    /// Starts a cooldown of `duration` ticks from `now`. Zero durations leave
    /// no entry.
    pub fn arm(&mut self, player: PlayerId, kind: ActionKind, now: Tick, duration: u64) {
        if duration == 0 {
            return;
        }
        self.ready_at.insert((player, kind), now + duration);
    }

    /// Drops entries that have already elapsed.
    pub fn prune(&mut self, now: Tick) {
        self.ready_at.retain(|_, ready_at| *ready_at > now);
    }

    pub fn len(&self) -> usize {
        self.ready_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready_at.is_empty()
    }

    pub fn clear(&mut self) {
        self.ready_at.clear();
    }
}
