use std::collections::BTreeMap;

use crate::action::Module;
use crate::state::PlayerId;

/// Fire-and-forget delivery of player-facing notices.
///
/// Delivery failures are the messenger's concern; the engine never observes
/// them.
pub trait Messenger {
    fn notify(&self, notice: Notice);
}

/// Template identifiers. Rendering is left to the host's message catalog.
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
pub enum MessageKey {
    // negotiation
    RequestSent,
    RequestReceived,
    RequestAccepted,
    RequestDenied,
    DenyConfirmed,
    RequestCanceled,
    CancelConfirmed,
    RequestExpired,

    // warmup
    WarmupStarted,
    Teleported,
    PartnerTeleported,
    CanceledMoved,
    CanceledDamaged,
    CanceledExplicit,
    CanceledDisconnected,
    PartnerCanceled,

    // action errors
    AlreadyBusy,
    DuplicatePending,
    NothingPending,
    NothingToCancel,
    OnCooldown,
    SelfTarget,
    TargetNotFound,
    ExecutionFailed,
    Disabled,
    NoDestination,
    PermissionDenied,
    CombatTagged,

    // homes
    HomeSaved,
    HomeDeleted,
    HomeList,
    InvalidName,
    NameTooLong,
    LimitReached,
    DuplicateName,
    NoSuchHome,
    NotOnGround,
    InLiquid,
    StorageFailed,

    // back / spawn
    DeathSaved,
    SpawnSet,

    // rules and info
    RulesLine,
    RulesPage,
    NoRules,
    Info,
    HelpTitle,
    HelpSection,
    HelpLine,
    Reloading,
    Reloaded,
    ReloadFailed,

    Usage,
}

/// Named template arguments, e.g. `player`, `seconds`, `name`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One message addressed to one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    pub recipient: PlayerId,
    pub module: Module,
    pub key: MessageKey,
    pub subs: Substitutions,
}

impl Notice {
    pub fn new(recipient: PlayerId, module: impl Into<Module>, key: MessageKey) -> Self {
        Self {
            recipient,
            module: module.into(),
            key,
            subs: Substitutions::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.subs = self.subs.with(key, value);
        self
    }
}
