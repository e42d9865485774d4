use crate::state::{Location, PlayerId};

use super::ActionKind;

/// Where a mover ends up once the warmup elapses.
///
/// Player destinations are re-read at execution time so a target that walked
/// away during the warmup is still reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Destination {
    Fixed(Location),
    Player(PlayerId),
}

/// Bookkeeping to run after a successful teleport.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FollowUp {
    #[default]
    None,
    /// Record the named home as last used and persist it.
    MarkHomeUsed(String),
}

/// Fully resolved parameters of one deferred action.
///
/// Every verb reduces to one of these: single-party verbs build it directly,
/// negotiations build it on accept.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionPlan {
    pub kind: ActionKind,
    /// Player whose position changes.
    pub mover: PlayerId,
    /// Player whose cooldown is read and armed.
    pub requester: PlayerId,
    /// Other party of a negotiation, notified of the outcome.
    pub counterpart: Option<PlayerId>,
    pub destination: Destination,
    /// Requester is exempt from warmup and cooldown.
    pub exempt: bool,
    pub follow_up: FollowUp,
}

impl ActionPlan {
    /// Plan for a single-party verb where the caller moves and pays.
    pub fn solo(kind: ActionKind, player: PlayerId, destination: Destination) -> Self {
        Self {
            kind,
            mover: player,
            requester: player,
            counterpart: None,
            destination,
            exempt: false,
            follow_up: FollowUp::None,
        }
    }

    #[must_use]
    pub fn exempt(mut self, exempt: bool) -> Self {
        self.exempt = exempt;
        self
    }

    #[must_use]
    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = follow_up;
        self
    }

    /// Every player this plan touches.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.mover == player || self.requester == player || self.counterpart == Some(player)
    }

    /// Party to notify besides the mover, if any.
    pub fn other_party(&self) -> Option<PlayerId> {
        if self.requester != self.mover {
            Some(self.requester)
        } else {
            self.counterpart.filter(|id| *id != self.mover)
        }
    }
}
