//! Collaborator errors.
//!
//! The engine treats these as opaque: world failures surface to players as
//! `ActionError::ExecutionFailed`, store failures as `HomeError::Storage`.

use crate::error::{ErrorSeverity, EssentialsError};
use crate::state::PlayerId;

/// Failures reported by the location store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoreError {
    #[error("failed to load locations for {0}: {1}")]
    Load(PlayerId, String),

    #[error("failed to save locations for {0}: {1}")]
    Save(PlayerId, String),

    #[error("spawn storage failed: {0}")]
    Spawn(String),
}

impl EssentialsError for StoreError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Load(..) => "STORE_LOAD",
            Self::Save(..) => "STORE_SAVE",
            Self::Spawn(_) => "STORE_SPAWN",
        }
    }
}

/// Failures reported by the world while relocating a player.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldError {
    #[error("player {0} is not in the world")]
    PlayerGone(PlayerId),

    #[error("region could not be loaded: {0}")]
    RegionUnavailable(String),

    #[error("no safe ground near destination")]
    NoSafeGround,

    #[error("teleport rejected: {0}")]
    Rejected(String),
}

impl EssentialsError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PlayerGone(_) | Self::NoSafeGround => ErrorSeverity::Recoverable,
            Self::RegionUnavailable(_) | Self::Rejected(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PlayerGone(_) => "WORLD_PLAYER_GONE",
            Self::RegionUnavailable(_) => "WORLD_REGION_UNAVAILABLE",
            Self::NoSafeGround => "WORLD_NO_SAFE_GROUND",
            Self::Rejected(_) => "WORLD_REJECTED",
        }
    }
}
