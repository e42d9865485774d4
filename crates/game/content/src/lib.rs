//! Server-authored content for the essentials engine.
//!
//! This crate houses the player-facing text and the settings file format:
//! - Message catalog with English defaults and per-verb prefixes
//! - Settings loader (TOML, durations in seconds)
//! - Message overrides loader (RON)
//!
//! Content is consumed by hosts and never appears in engine state.

pub mod messages;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use messages::{MessageCatalog, english};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, MessageLoader, SettingsFile};
