//! Session management module.
//!
//! Provides the persisted user session, the key-value stores backing it and
//! the store that mirrors the phone number into native preferences.

mod model;
mod repository;
mod store;

pub use model::Session;
pub use repository::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use store::{SessionStore, keys};
