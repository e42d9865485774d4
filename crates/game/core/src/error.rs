//! Common error infrastructure for essentials-core.
//!
//! Every engine entry point returns either a success value or one of the
//! errors below. They are user-facing outcomes rather than faults: the
//! dispatcher turns each of them into a notice for the caller.
//!
//! Collaborator failures (`StoreError`, `WorldError`) are defined next to the
//! oracle traits in [`crate::env`]; home management errors live with the home
//! verbs in [`crate::action`].

use crate::action::{HomeError, Module};
use crate::env::StoreError;

/// Severity level of an error, used for categorization and logging.
///
/// - **Recoverable**: the same command may succeed later (cooldown, busy)
/// - **Validation**: the input was wrong and should not be retried as is
/// - **Internal**: a collaborator misbehaved or state is inconsistent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all essentials-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable SCREAMING_SNAKE identifiers used by hosts and tests
pub trait EssentialsError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Expected outcomes that stop an action from going ahead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// Mover already has a live warmup.
    #[error("player is already teleporting")]
    AlreadyBusy,

    /// Sender already has a live outgoing request of the same kind.
    #[error("an outgoing request is already pending")]
    DuplicateSenderPending,

    #[error("no pending request")]
    NothingPending,

    #[error("nothing to cancel")]
    NothingToCancel,

    #[error("on cooldown for {seconds_remaining}s")]
    OnCooldown { seconds_remaining: u64 },

    #[error("cannot target yourself")]
    SelfTarget,

    #[error("target player not found")]
    TargetNotFound,

    /// Destination resolution or world mutation failed.
    #[error("teleport failed: {0}")]
    ExecutionFailed(String),

    #[error("{0} is disabled")]
    Disabled(Module),

    /// No home, death point or spawn to travel to.
    #[error("no destination available")]
    NoDestination,

    #[error("permission denied")]
    PermissionDenied,

    #[error("in combat for another {seconds}s")]
    CombatTagged { seconds: u64 },
}

impl EssentialsError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            AlreadyBusy | DuplicateSenderPending | OnCooldown { .. } | CombatTagged { .. } => {
                ErrorSeverity::Recoverable
            }
            NothingPending | NothingToCancel | SelfTarget | TargetNotFound | Disabled(_)
            | NoDestination | PermissionDenied => ErrorSeverity::Validation,
            ExecutionFailed(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            AlreadyBusy => "ACTION_ALREADY_BUSY",
            DuplicateSenderPending => "ACTION_DUPLICATE_SENDER_PENDING",
            NothingPending => "ACTION_NOTHING_PENDING",
            NothingToCancel => "ACTION_NOTHING_TO_CANCEL",
            OnCooldown { .. } => "ACTION_ON_COOLDOWN",
            SelfTarget => "ACTION_SELF_TARGET",
            TargetNotFound => "ACTION_TARGET_NOT_FOUND",
            ExecutionFailed(_) => "ACTION_EXECUTION_FAILED",
            Disabled(_) => "ACTION_DISABLED",
            NoDestination => "ACTION_NO_DESTINATION",
            PermissionDenied => "ACTION_PERMISSION_DENIED",
            CombatTagged { .. } => "ACTION_COMBAT_TAGGED",
        }
    }
}

/// Error returned by [`crate::engine::Engine::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Home(#[from] HomeError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl EssentialsError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(err) => err.severity(),
            Self::Home(err) => err.severity(),
            Self::Storage(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(err) => err.error_code(),
            Self::Home(err) => err.error_code(),
            Self::Storage(err) => err.error_code(),
        }
    }
}
