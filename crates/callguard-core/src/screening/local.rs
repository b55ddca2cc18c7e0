//! In-process call-screening bridge.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{CallScreeningBridge, EVENT_BUFFER_SIZE, ScreenedCall, ScreeningSubscription, ServiceStatus};
use crate::Result;
use crate::preferences::{NativePreferences, screening_enabled_or_default};

/// Bridge that lives in the client process.
///
/// Holds the screening role flag and fans screened-call events out to
/// subscribers. Events come from [`emit`](Self::emit), usually fed by an
/// [`IngestServer`](super::IngestServer) that a native helper connects to.
pub struct LocalBridge {
    events: broadcast::Sender<ScreenedCall>,
    role_granted: AtomicBool,
    preferences: Arc<dyn NativePreferences>,
}

impl LocalBridge {
    /// Create a bridge reading the screening flag from `preferences`.
    #[must_use]
    pub fn new(preferences: Arc<dyn NativePreferences>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            events,
            role_granted: AtomicBool::new(false),
            preferences,
        }
    }

    /// Publish a screened call to every subscriber.
    ///
    /// Returns how many subscribers received it.
    pub fn emit(&self, call: ScreenedCall) -> usize {
        debug!("Call screened: {} ({})", call.phone_number, call.action);
        self.events.send(call).unwrap_or(0)
    }

    /// Whether the screening role has been granted.
    #[must_use]
    pub fn has_role(&self) -> bool {
        self.role_granted.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for LocalBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBridge")
            .field("subscribers", &self.events.receiver_count())
            .field("role_granted", &self.has_role())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CallScreeningBridge for LocalBridge {
    async fn request_role(&self) -> Result<String> {
        if self.role_granted.swap(true, Ordering::AcqRel) {
            return Ok("Call screening role already granted".to_string());
        }
        info!("Call screening role granted");
        Ok("Call screening role granted".to_string())
    }

    async fn check_service_status(&self) -> Result<ServiceStatus> {
        let message = if !self.has_role() {
            "Call screening role not granted"
        } else if screening_enabled_or_default(self.preferences.as_ref()).await {
            "Call screening service is running"
        } else {
            "Call screening is disabled"
        };
        Ok(ServiceStatus {
            message: message.to_string(),
        })
    }

    fn subscribe(&self) -> ScreeningSubscription {
        ScreeningSubscription::new(self.events.subscribe())
    }
}
