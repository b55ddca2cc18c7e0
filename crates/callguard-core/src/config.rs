//! Application configuration and on-disk locations.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::login::DEFAULT_CODE_TTL;
use crate::{Error, Result};

/// Directory name under the platform config and data directories.
pub const APP_DIR: &str = "callguard";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "CALLGUARD_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_CLOUD_NUMBER: &str = "8046809151";

/// User-editable settings, stored as `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Number calls are forwarded to when forwarding is enabled.
    pub cloud_number: String,
    /// Passcode lifetime in seconds.
    pub otp_ttl_secs: u64,
    /// Where to accept events from a native screening helper, if anywhere.
    pub bridge_ingest_addr: Option<SocketAddr>,
    /// This device's own phone number, offered as the login auto-fill.
    pub device_number: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cloud_number: DEFAULT_CLOUD_NUMBER.to_string(),
            otp_ttl_secs: DEFAULT_CODE_TTL.as_secs(),
            bridge_ingest_addr: None,
            device_number: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location, then apply environment overrides.
    ///
    /// On first run the defaults are written out so they can be edited.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting base URL is invalid.
    pub async fn load() -> Result<Self> {
        let path = config_path();
        let mut config = Self::load_or_create(&path).await?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, using defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                debug!("Loaded config from {path:?}");
                Ok(serde_json::from_str(&contents)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `path`, writing the defaults there if the file is missing.
    ///
    /// Failing to write the defaults is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path).await? {
            return Self::load_from(path).await;
        }
        let config = Self::default();
        if let Err(e) = config.save_to(path).await {
            warn!("Failed to write default config to {path:?}: {e}");
        }
        Ok(config)
    }

    /// Write to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(self)?).await?;
        info!("Config saved to {path:?}");
        Ok(())
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("Backend base URL overridden by {BASE_URL_ENV}");
            self.base_url = base_url.trim().to_string();
        }
    }

    /// Check the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unusable base URL, an empty cloud number
    /// or a zero passcode lifetime.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url()?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.cloud_number.trim().is_empty() {
            return Err(Error::Config("cloud_number must not be empty".to_string()));
        }
        if self.otp_ttl_secs == 0 {
            return Err(Error::Config("otp_ttl_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Parsed backend base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Passcode lifetime.
    #[must_use]
    pub const fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_secs)
    }
}

/// `<config dir>/callguard`.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// `<data dir>/callguard`.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Path of `config.json`.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Path of the session database.
#[must_use]
pub fn database_path() -> PathBuf {
    data_dir().join("callguard.db")
}

/// Path of the native preference file.
#[must_use]
pub fn preferences_path() -> PathBuf {
    data_dir().join("preferences.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json"))
            .await
            .unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.otp_ttl(), DEFAULT_CODE_TTL);
        config.validate().unwrap();
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            base_url: "https://screening.example.com/api".to_string(),
            cloud_number: "8000000000".to_string(),
            otp_ttl_secs: 120,
            bridge_ingest_addr: Some("127.0.0.1:7878".parse().unwrap()),
            device_number: Some("+91 98765 43210".to_string()),
        };

        config.save_to(&path).await.unwrap();
        assert_eq!(AppConfig::load_from(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callguard").join("config.json");

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        tokio::fs::write(&path, r#"{"cloud_number": "8000000000"}"#)
            .await
            .unwrap();
        let edited = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(edited.cloud_number, "8000000000");
    }

    #[tokio::test]
    async fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"cloud_number": "8000000000"}"#)
            .await
            .unwrap();

        let config = AppConfig::load_from(&path).await.unwrap();
        assert_eq!(config.cloud_number, "8000000000");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.bridge_ingest_addr.is_none());
    }

    #[test]
    fn environment_overrides_base_url() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| {
            (key == BASE_URL_ENV).then(|| " https://override.example.com ".to_string())
        });
        assert_eq!(config.base_url, "https://override.example.com");

        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.base_url, "https://override.example.com");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_url = AppConfig {
            base_url: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_scheme = AppConfig {
            base_url: "mailto:ops@example.com".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(bad_scheme.validate(), Err(Error::Config(_))));

        let zero_ttl = AppConfig {
            otp_ttl_secs: 0,
            ..AppConfig::default()
        };
        assert!(zero_ttl.validate().is_err());
    }

    #[test]
    fn paths_live_under_app_dir() {
        assert!(database_path().ends_with("callguard/callguard.db"));
        assert!(preferences_path().ends_with("callguard/preferences.json"));
        assert!(config_path().ends_with("callguard/config.json"));
    }
}
