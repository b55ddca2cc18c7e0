//! Native preference store.
//!
//! The native call-screening service runs without the UI, so the values it
//! needs (the user's phone number and whether screening is enabled) are
//! mirrored into a store it can read on its own.

mod file;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::Result;

pub use file::FilePreferences;

/// Preference surface shared with the native call-screening service.
#[async_trait]
pub trait NativePreferences: Send + Sync {
    /// Store the logged-in user's phone number.
    async fn save_phone_number(&self, phone_number: &str) -> Result<()>;

    /// Read the stored phone number, if any.
    async fn phone_number(&self) -> Result<Option<String>>;

    /// Forget the stored phone number.
    async fn clear_phone_number(&self) -> Result<()>;

    /// Enable or disable call screening.
    async fn set_call_screening_enabled(&self, enabled: bool) -> Result<()>;

    /// Whether call screening is enabled.
    async fn is_call_screening_enabled(&self) -> Result<bool>;
}

/// Read the screening flag, treating an unreadable store as enabled.
pub async fn screening_enabled_or_default(preferences: &dyn NativePreferences) -> bool {
    match preferences.is_call_screening_enabled().await {
        Ok(enabled) => enabled,
        Err(e) => {
            warn!("Failed to read call screening preference, assuming enabled: {e}");
            true
        }
    }
}

/// Values held by a preference store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub(crate) struct PreferenceValues {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "default_screening_enabled")]
    pub call_screening_enabled: bool,
}

impl Default for PreferenceValues {
    fn default() -> Self {
        Self {
            phone_number: None,
            call_screening_enabled: default_screening_enabled(),
        }
    }
}

const fn default_screening_enabled() -> bool {
    true
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<PreferenceValues>,
}

impl MemoryPreferences {
    /// Create a store with screening enabled and no phone number.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NativePreferences for MemoryPreferences {
    async fn save_phone_number(&self, phone_number: &str) -> Result<()> {
        self.values.lock().await.phone_number = Some(phone_number.to_string());
        Ok(())
    }

    async fn phone_number(&self) -> Result<Option<String>> {
        Ok(self.values.lock().await.phone_number.clone())
    }

    async fn clear_phone_number(&self) -> Result<()> {
        self.values.lock().await.phone_number = None;
        Ok(())
    }

    async fn set_call_screening_enabled(&self, enabled: bool) -> Result<()> {
        self.values.lock().await.call_screening_enabled = enabled;
        Ok(())
    }

    async fn is_call_screening_enabled(&self) -> Result<bool> {
        Ok(self.values.lock().await.call_screening_enabled)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;

    use super::NativePreferences;
    use crate::{Error, Result};

    /// Store whose every operation fails.
    pub struct BrokenPreferences;

    #[async_trait]
    impl NativePreferences for BrokenPreferences {
        async fn save_phone_number(&self, _phone_number: &str) -> Result<()> {
            Err(Error::Preferences("unavailable".to_string()))
        }

        async fn phone_number(&self) -> Result<Option<String>> {
            Err(Error::Preferences("unavailable".to_string()))
        }

        async fn clear_phone_number(&self) -> Result<()> {
            Err(Error::Preferences("unavailable".to_string()))
        }

        async fn set_call_screening_enabled(&self, _enabled: bool) -> Result<()> {
            Err(Error::Preferences("unavailable".to_string()))
        }

        async fn is_call_screening_enabled(&self) -> Result<bool> {
            Err(Error::Preferences("unavailable".to_string()))
        }
    }
}
