//! Persistence for data that changes while the server runs.
//!
//! Homes are stored per player and the custom spawn once per server. Both
//! stores implement [`essentials_core::LocationStore`] so the engine never
//! sees the storage medium.

mod error;
mod file;
mod memory;

pub use error::{RepositoryError, Result};
pub use file::FileLocationStore;
pub use memory::InMemoryLocationStore;
