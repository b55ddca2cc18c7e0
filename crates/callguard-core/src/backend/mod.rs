//! Backend client.
//!
//! The backend delivers one-time passcodes, registers users and serves the
//! conversation history recorded by the screening assistant. Calls are plain
//! request/response; nothing is retried.

mod http;
mod model;

use async_trait::async_trait;

use crate::Result;
use crate::conversation::ConversationHistory;

pub use http::HttpBackend;
pub use model::{SendCodeResponse, UserDetails};

/// Operations the client needs from the backend.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Ask the backend to deliver `code` to `phone_number` out of band.
    ///
    /// The response says whether the number already belongs to a user.
    async fn send_code(&self, phone_number: &str, code: &str) -> Result<SendCodeResponse>;

    /// Register a new user.
    async fn register(&self, phone_number: &str, name: &str) -> Result<()>;

    /// Fetch every screened-call conversation for a user.
    async fn conversations(&self, user_id: &str) -> Result<ConversationHistory>;
}
