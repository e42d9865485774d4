use thiserror::Error;

/// Errors raised by the location stores.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("location store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
