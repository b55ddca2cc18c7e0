//! Localhost event ingest for the call-screening bridge.
//!
//! A native helper process connects over TCP and writes one JSON event per
//! line, e.g. `{"event":"CALL_SCREENED","phoneNumber":"…","action":"…"}`.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BridgeEvent, LocalBridge};
use crate::Result;

/// Listener that feeds helper events into a [`LocalBridge`].
///
/// Stops accepting when dropped.
#[derive(Debug)]
pub struct IngestServer {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl IngestServer {
    /// Bind `addr` and start forwarding events to `bridge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, bridge: Arc<LocalBridge>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Screening event ingest listening on {local_addr}");

        let task = tokio::spawn(accept_loop(listener, bridge));
        Ok(Self { local_addr, task })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for IngestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(listener: TcpListener, bridge: Arc<LocalBridge>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("Screening helper connected from {peer}");
                tokio::spawn(read_events(stream, Arc::clone(&bridge)));
            }
            Err(e) => warn!("Failed to accept screening helper: {e}"),
        }
    }
}

async fn read_events<R: AsyncRead + Unpin>(stream: R, bridge: Arc<LocalBridge>) {
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<BridgeEvent>(line) {
            Ok(BridgeEvent::CallScreened(call)) => {
                bridge.emit(call);
            }
            Err(e) => {
                let preview: String = line.chars().take(200).collect();
                warn!("Ignoring malformed screening event: {e}, line: {preview}");
            }
        }
    }
    debug!("Screening helper disconnected");
}
