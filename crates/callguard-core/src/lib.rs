//! # callguard-core
//!
//! Core business logic for the `CallGuard` call-screening client.
//!
//! This crate provides:
//! - **Login Flow** - phone number, one-time passcode and name wizard
//! - **Session Store** - persisted identity mirrored into native preferences
//! - **Backend Client** - OTP dispatch, registration and conversation history
//! - **Call Screening** - bridge interface, screened-call events, local bridge
//! - **Dialer** - `tel:` URIs for redial and call-forwarding USSD codes
//! - **Application State** - one state struct mutated through commands

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod backend;
pub mod config;
pub mod conversation;
pub mod dialer;
mod error;
pub mod login;
pub mod preferences;
pub mod screening;
pub mod session;

pub use app::{Alert, AlertKind, AppState, Effect, Hydrated, Phase, Services};
pub use backend::{BackendClient, HttpBackend, SendCodeResponse, UserDetails};
pub use config::AppConfig;
pub use conversation::{ConversationHistory, ConversationRecord, ConversationSummary, Exchange};
pub use dialer::{ForwardingCode, redial_uri, tel_uri};
pub use error::{Error, Result};
pub use login::{
    CodeRequest, Identity, LoginError, LoginFlow, LoginStep, NameRequest, OtpChallenge,
    ValidationError, VerifyOutcome, normalize_phone_number,
};
pub use preferences::{FilePreferences, MemoryPreferences, NativePreferences};
pub use screening::{
    BridgeEvent, CallScreeningBridge, IngestServer, LocalBridge, ScreenedCall,
    ScreeningSubscription, ServiceStatus, VerificationStatus,
};
pub use session::{
    KeyValueStore, MemoryKeyValueStore, Session, SessionStore, SqliteKeyValueStore,
};
