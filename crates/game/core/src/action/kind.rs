//! Action kinds - the five teleport verbs the engine parameterizes over.

/// Kinds of deferred teleport actions.
///
/// Each kind owns its own settings block, cooldown column and notice prefix.
/// Behavior differences between kinds are pure parameters of the shared
/// engine: who moves, where to, which watchers run.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    /// Travel to a saved named location.
    Home,
    /// Return to the last recorded death point.
    Back,
    /// Warp to the server spawn.
    Spawn,
    /// Negotiated push: the requester travels to the receiver.
    Tpa,
    /// Negotiated pull: the receiver travels to the requester.
    Tpr,
}

impl ActionKind {
    /// Negotiation flavour for two-party kinds.
    pub const fn negotiation(self) -> Option<NegotiationKind> {
        match self {
            Self::Tpa => Some(NegotiationKind::Tpa),
            Self::Tpr => Some(NegotiationKind::Tpr),
            Self::Home | Self::Back | Self::Spawn => None,
        }
    }
}

/// Feature a notice or command belongs to.
///
/// Every [`ActionKind`] is a module of its own; the remaining modules are the
/// informational commands that never teleport anyone.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Module {
    Home,
    Back,
    Spawn,
    Tpa,
    Tpr,
    /// `/rules` pages.
    Rules,
    /// `/essentialsx` info, help and reload.
    Info,
}

impl Module {
    pub const fn action_kind(self) -> Option<ActionKind> {
        match self {
            Self::Home => Some(ActionKind::Home),
            Self::Back => Some(ActionKind::Back),
            Self::Spawn => Some(ActionKind::Spawn),
            Self::Tpa => Some(ActionKind::Tpa),
            Self::Tpr => Some(ActionKind::Tpr),
            Self::Rules | Self::Info => None,
        }
    }
}

impl From<ActionKind> for Module {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Home => Self::Home,
            ActionKind::Back => Self::Back,
            ActionKind::Spawn => Self::Spawn,
            ActionKind::Tpa => Self::Tpa,
            ActionKind::Tpr => Self::Tpr,
        }
    }
}

/// Two-party request/accept protocols.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NegotiationKind {
    Tpa,
    Tpr,
}

impl NegotiationKind {
    pub const fn action_kind(self) -> ActionKind {
        match self {
            Self::Tpa => ActionKind::Tpa,
            Self::Tpr => ActionKind::Tpr,
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Self::Tpa => Direction::Push,
            Self::Tpr => Direction::Pull,
        }
    }
}

/// Which party of an accepted negotiation physically moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sender travels to receiver.
    Push,
    /// Receiver travels to sender.
    Pull,
}
