use std::collections::BTreeMap;

use crate::action::NegotiationKind;
use crate::error::ActionError;
use crate::state::{PlayerId, Tick};

/// One outstanding two-party request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingRequest {
    pub kind: NegotiationKind,
    pub sender: PlayerId,
    pub receiver: PlayerId,
    pub expires_at: Tick,
}

impl PendingRequest {
    /// A request stays live through its expiry tick.
    pub fn is_live(&self, now: Tick) -> bool {
        now <= self.expires_at
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.sender == player || self.receiver == player
    }
}

/// Outstanding requests keyed by `(kind, receiver)`.
///
/// The key makes "one request per receiver per kind" structural; sender
/// uniqueness is checked on [`Self::propose`].
#[derive(Clone, Debug, Default)]
pub struct PendingRegistry {
    entries: BTreeMap<(NegotiationKind, PlayerId), PendingRequest>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request, replacing any request already waiting on the
    /// receiver. Returns the replaced request.
    ///
    /// Fails with [`ActionError::DuplicateSenderPending`] when the sender
    /// already has a live request of the same kind. Self-targeting must be
    /// rejected by the caller.
    pub fn propose(
        &mut self,
        kind: NegotiationKind,
        sender: PlayerId,
        receiver: PlayerId,
        now: Tick,
        ttl: u64,
    ) -> Result<Option<PendingRequest>, ActionError> {
        if self.outgoing(kind, sender, now).is_some() {
            return Err(ActionError::DuplicateSenderPending);
        }
        let request = PendingRequest {
            kind,
            sender,
            receiver,
            expires_at: now + ttl,
        };
        let replaced = self
            .entries
            .insert((kind, receiver), request)
            .filter(|old| old.is_live(now));
        Ok(replaced)
    }

    /// Live request waiting on `receiver`. An expired entry is removed and
    /// reported as absent.
    pub fn resolve(
        &mut self,
        kind: NegotiationKind,
        receiver: PlayerId,
        now: Tick,
    ) -> Option<PendingRequest> {
        let key = (kind, receiver);
        let request = *self.entries.get(&key)?;
        if request.is_live(now) {
            Some(request)
        } else {
            self.entries.remove(&key);
            None
        }
    }

    pub fn withdraw(&mut self, kind: NegotiationKind, receiver: PlayerId) -> Option<PendingRequest> {
        self.entries.remove(&(kind, receiver))
    }

    /// Live request sent by `sender`, if any.
    pub fn outgoing(
        &self,
        kind: NegotiationKind,
        sender: PlayerId,
        now: Tick,
    ) -> Option<PendingRequest> {
        self.entries
            .values()
            .find(|r| r.kind == kind && r.sender == sender && r.is_live(now))
            .copied()
    }

    /// Removes every expired entry and returns them.
    pub fn sweep_expired(&mut self, now: Tick) -> Vec<PendingRequest> {
        let mut expired = Vec::new();
        self.entries.retain(|_, request| {
            if request.is_live(now) {
                true
            } else {
                expired.push(*request);
                false
            }
        });
        expired
    }

    /// Removes every entry where `player` is sender or receiver.
    pub fn remove_all_for(&mut self, player: PlayerId) -> Vec<PendingRequest> {
        let mut removed = Vec::new();
        self.entries.retain(|_, request| {
            if request.involves(player) {
                removed.push(*request);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn references(&self, player: PlayerId) -> bool {
        self.entries.values().any(|r| r.involves(player))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
