//! Application state and services.
//!
//! [`AppState`] holds everything the shell renders. Reducers on it validate
//! input, apply results and return the [`Effect`]s to run next; [`Services`]
//! runs those effects against the injected stores, backend and bridge.

mod alert;
mod services;
mod state;

pub use alert::{Alert, AlertKind};
pub use services::Services;
pub use state::{AppState, Effect, Hydrated, Phase};
