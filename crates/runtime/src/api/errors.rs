//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories and the engine so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use essentials_core::{CommandError, CommandParseError, PlayerId, StoreError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Error type returned by a host's settings source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to load persisted state")]
    InitialState(#[source] StoreError),

    #[error(transparent)]
    Parse(#[from] CommandParseError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("player {0} is not online")]
    UnknownPlayer(PlayerId),

    #[error("no settings source configured")]
    ReloadUnavailable,

    #[error("failed to reload settings")]
    Reload(#[source] BoxError),

    #[error("tick rate cannot change while running ({from} Hz -> {to} Hz)")]
    TickRateChanged { from: u64, to: u64 },
}
