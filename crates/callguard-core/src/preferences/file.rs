//! JSON-file preference store.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{NativePreferences, PreferenceValues};
use crate::Result;

/// Preference store persisted as a small JSON document.
///
/// The file lives in the application data directory so a background helper
/// can read it while the UI is closed.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    /// Create a store at the given path. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<PreferenceValues> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PreferenceValues::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `change` to the stored values and write them back.
    async fn update(&self, change: impl FnOnce(&mut PreferenceValues) + Send) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut values = self.read().await?;
        change(&mut values);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling file and rename so readers never see a torn write
        let tmp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&values)?;
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!("Preferences written to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl NativePreferences for FilePreferences {
    async fn save_phone_number(&self, phone_number: &str) -> Result<()> {
        let phone_number = phone_number.to_string();
        self.update(move |v| v.phone_number = Some(phone_number)).await
    }

    async fn phone_number(&self) -> Result<Option<String>> {
        Ok(self.read().await?.phone_number)
    }

    async fn clear_phone_number(&self) -> Result<()> {
        self.update(|v| v.phone_number = None).await
    }

    async fn set_call_screening_enabled(&self, enabled: bool) -> Result<()> {
        self.update(move |v| v.call_screening_enabled = enabled).await
    }

    async fn is_call_screening_enabled(&self) -> Result<bool> {
        Ok(self.read().await?.call_screening_enabled)
    }
}
