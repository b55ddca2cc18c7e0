//! Native call-screening bridge.
//!
//! The platform service that intercepts incoming calls sits behind
//! [`CallScreeningBridge`]. It grants the screening role, reports its status
//! and publishes an event for every call it screens.

mod ingest;
mod local;
mod model;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

use crate::Result;

pub use ingest::IngestServer;
pub use local::LocalBridge;
pub use model::{BridgeEvent, ScreenedCall, ServiceStatus, VerificationStatus};

/// Events buffered per subscriber before it starts skipping.
pub const EVENT_BUFFER_SIZE: usize = 16;

/// Capabilities of the native call-screening service.
#[async_trait]
pub trait CallScreeningBridge: Send + Sync {
    /// Ask the platform to make this app the call-screening service.
    ///
    /// Returns the platform's answer for display.
    async fn request_role(&self) -> Result<String>;

    /// Report whether the screening service is running.
    async fn check_service_status(&self) -> Result<ServiceStatus>;

    /// Receive screened-call events until the subscription is dropped.
    fn subscribe(&self) -> ScreeningSubscription;
}

/// Stream of screened calls. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ScreeningSubscription {
    receiver: broadcast::Receiver<ScreenedCall>,
}

impl ScreeningSubscription {
    pub(crate) const fn new(receiver: broadcast::Receiver<ScreenedCall>) -> Self {
        Self { receiver }
    }

    /// Wait for the next screened call.
    ///
    /// A subscriber that fell behind skips to the oldest event still
    /// buffered. Returns `None` once the bridge is gone.
    pub async fn next(&mut self) -> Option<ScreenedCall> {
        loop {
            match self.receiver.recv().await {
                Ok(call) => return Some(call),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Screening subscriber lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered call without waiting.
    pub fn try_next(&mut self) -> Option<ScreenedCall> {
        loop {
            match self.receiver.try_recv() {
                Ok(call) => return Some(call),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!("Screening subscriber lagged, skipped {skipped} events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything buffered and keep only the newest call.
    pub fn latest(&mut self) -> Option<ScreenedCall> {
        std::iter::from_fn(|| self.try_next()).last()
    }
}
