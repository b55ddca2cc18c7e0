//! Injected capabilities and the async legs of each command.

use std::sync::Arc;

use tracing::{info, warn};

use super::alert::Alert;
use super::state::Hydrated;
use crate::backend::{BackendClient, HttpBackend, SendCodeResponse};
use crate::config::{self, AppConfig};
use crate::conversation::ConversationHistory;
use crate::login::{self, CodeRequest, LoginError, NameRequest};
use crate::preferences::{FilePreferences, NativePreferences, screening_enabled_or_default};
use crate::screening::{
    CallScreeningBridge, IngestServer, LocalBridge, ScreeningSubscription, ServiceStatus,
};
use crate::session::{Session, SessionStore, SqliteKeyValueStore};
use crate::Result;

/// Everything the app talks to.
///
/// Cheap to clone; every capability is shared.
#[derive(Clone)]
pub struct Services {
    sessions: SessionStore,
    preferences: Arc<dyn NativePreferences>,
    backend: Arc<dyn BackendClient>,
    bridge: Arc<dyn CallScreeningBridge>,
    ingest: Option<Arc<IngestServer>>,
    device_number: Option<String>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("ingest", &self.ingest.as_ref().map(|s| s.local_addr()))
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Assemble services from explicit capabilities.
    #[must_use]
    pub fn new(
        sessions: SessionStore,
        preferences: Arc<dyn NativePreferences>,
        backend: Arc<dyn BackendClient>,
        bridge: Arc<dyn CallScreeningBridge>,
    ) -> Self {
        Self {
            sessions,
            preferences,
            backend,
            bridge,
            ingest: None,
            device_number: None,
        }
    }

    /// Offer `number` as the login auto-fill.
    #[must_use]
    pub fn with_device_number(mut self, number: impl Into<String>) -> Self {
        self.device_number = Some(number.into());
        self
    }

    /// Open the on-disk stores and connect to the configured backend.
    ///
    /// Starts the screening event ingest if the config names an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or database cannot be opened,
    /// the base URL is invalid, or the ingest address cannot be bound.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let data_dir = config::data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let database = config::database_path();
        let store = SqliteKeyValueStore::new(&database.to_string_lossy()).await?;
        let preferences: Arc<dyn NativePreferences> =
            Arc::new(FilePreferences::new(config::preferences_path()));
        let backend = Arc::new(HttpBackend::new(config.base_url()?));
        let bridge = Arc::new(LocalBridge::new(Arc::clone(&preferences)));

        let ingest = match config.bridge_ingest_addr {
            Some(addr) => Some(Arc::new(IngestServer::bind(addr, Arc::clone(&bridge)).await?)),
            None => None,
        };

        info!("Services ready, backend at {}", backend.base_url());
        Ok(Self {
            sessions: SessionStore::new(Arc::new(store), Arc::clone(&preferences)),
            preferences,
            backend,
            bridge,
            ingest,
            device_number: config.device_number.clone(),
        })
    }

    /// Load the stored session and screening flag.
    pub async fn hydrate(&self) -> Hydrated {
        Hydrated {
            session: self.sessions.load().await,
            screening_enabled: screening_enabled_or_default(self.preferences.as_ref()).await,
        }
    }

    /// Device phone number for auto-filling the login form, normalised.
    ///
    /// The configured device number wins. Otherwise the number in native
    /// preferences is used; a native helper may write it, and a login
    /// mirrors it there until logout.
    ///
    /// # Errors
    ///
    /// Returns an error alert if no number is known or it cannot be read.
    pub async fn phone_hint(&self) -> std::result::Result<String, Alert> {
        let stored = match &self.device_number {
            Some(number) => Some(number.clone()),
            None => self.preferences.phone_number().await.map_err(|e| {
                warn!("Failed to read phone number hint: {e}");
                Alert::error("Failed to retrieve phone number")
            })?,
        };
        stored
            .map(|number| login::normalize_phone_number(&number))
            .filter(|number| !number.is_empty())
            .ok_or_else(|| Alert::error("Failed to retrieve phone number"))
    }

    /// Deliver a passcode.
    ///
    /// # Errors
    ///
    /// Returns a display-ready [`LoginError::Backend`].
    pub async fn send_code(&self, request: &CodeRequest) -> std::result::Result<SendCodeResponse, LoginError> {
        login::deliver_code(self.backend.as_ref(), request).await
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns a display-ready [`LoginError::Backend`].
    pub async fn register(&self, request: &NameRequest) -> std::result::Result<(), LoginError> {
        login::register_name(self.backend.as_ref(), request).await
    }

    /// Save the session of a completed login.
    ///
    /// # Errors
    ///
    /// Returns an error alert if either store fails.
    pub async fn persist_login(&self, session: &Session) -> std::result::Result<(), Alert> {
        self.sessions.save(session).await.map_err(|e| {
            warn!("Failed to save session: {e}");
            Alert::from_error(&e, "Failed to save your session. Please try again.")
        })
    }

    /// Clear the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error alert if either store fails.
    pub async fn logout(&self) -> std::result::Result<(), Alert> {
        self.sessions.clear().await.map_err(|e| {
            warn!("Failed to log out: {e}");
            Alert::from_error(&e, "Failed to logout. Please try again.")
        })
    }

    /// Store the screening flag.
    ///
    /// # Errors
    ///
    /// Returns an error alert if the preference store fails.
    pub async fn set_screening_enabled(&self, enabled: bool) -> std::result::Result<(), Alert> {
        self.preferences
            .set_call_screening_enabled(enabled)
            .await
            .map(|()| info!("Call screening {}", if enabled { "ENABLED" } else { "DISABLED" }))
            .map_err(|e| {
                warn!("Failed to update call screening preference: {e}");
                Alert::error("Failed to update call screening preference")
            })
    }

    /// Fetch the user's conversation history.
    ///
    /// # Errors
    ///
    /// Returns an error alert on any backend failure.
    pub async fn fetch_conversations(
        &self,
        user_id: &str,
    ) -> std::result::Result<ConversationHistory, Alert> {
        self.backend.conversations(user_id).await.map_err(|e| {
            warn!("Failed to fetch conversations: {e}");
            Alert::error("Failed to fetch conversations")
        })
    }

    /// Ask to become the call-screening service.
    ///
    /// # Errors
    ///
    /// Returns an error alert with the bridge's message when it gave one.
    pub async fn request_role(&self) -> std::result::Result<String, Alert> {
        self.bridge.request_role().await.map_err(|e| {
            warn!("Failed to request call screening role: {e}");
            Alert::from_error(&e, "Failed to request call screening")
        })
    }

    /// Check the screening service status.
    ///
    /// # Errors
    ///
    /// Returns an error alert with the bridge's message when it gave one.
    pub async fn check_service_status(&self) -> std::result::Result<ServiceStatus, Alert> {
        self.bridge.check_service_status().await.map_err(|e| {
            warn!("Failed to check service status: {e}");
            Alert::from_error(&e, "Failed to check service status")
        })
    }

    /// Subscribe to screened calls.
    #[must_use]
    pub fn subscribe(&self) -> ScreeningSubscription {
        self.bridge.subscribe()
    }
}
