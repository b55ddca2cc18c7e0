//! Persistent session store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::model::Session;
use super::repository::KeyValueStore;
use crate::Result;
use crate::preferences::NativePreferences;

/// Storage keys for the persisted session.
pub mod keys {
    /// Display name.
    pub const USER_NAME: &str = "@user_name";
    /// Verified phone number.
    pub const PHONE_NUMBER: &str = "@phone_number";
    /// JSON-encoded registration flag.
    pub const IS_REGISTERED: &str = "@is_registered";

    /// Every session key, in storage order.
    pub const ALL: [&str; 3] = [USER_NAME, PHONE_NUMBER, IS_REGISTERED];
}

/// Saves, loads and clears the user session.
///
/// The session lives in the device key-value store; the phone number is also
/// mirrored into the native preference store.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    native: Arc<dyn NativePreferences>,
}

impl SessionStore {
    /// Create a session store over the given backends.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, native: Arc<dyn NativePreferences>) -> Self {
        Self { store, native }
    }

    /// Persist a session.
    ///
    /// # Errors
    ///
    /// Returns an error if either the key-value store or the native mirror
    /// fails. The caller should treat the session as not saved.
    pub async fn save(&self, session: &Session) -> Result<()> {
        self.store
            .multi_set(&[
                (keys::USER_NAME, session.user_name.clone()),
                (keys::PHONE_NUMBER, session.phone_number.clone()),
                (keys::IS_REGISTERED, serde_json::to_string(&session.is_registered)?),
            ])
            .await?;

        self.native.save_phone_number(&session.phone_number).await?;

        info!("Session saved for {}", session.phone_number);
        Ok(())
    }

    /// Load the stored session.
    ///
    /// Returns `None` unless every key is present. Storage failures are
    /// logged and reported as no session.
    pub async fn load(&self) -> Option<Session> {
        let values = match self.store.multi_get(&keys::ALL).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to load session: {e}");
                return None;
            }
        };

        let [user_name, phone_number, is_registered] = <[Option<String>; 3]>::try_from(values).ok()?;
        let user_name = user_name.filter(|v| !v.is_empty())?;
        let phone_number = phone_number.filter(|v| !v.is_empty())?;
        let is_registered = match serde_json::from_str::<bool>(&is_registered?) {
            Ok(flag) => flag,
            Err(e) => {
                warn!("Stored registration flag is unreadable: {e}");
                return None;
            }
        };

        debug!("Session restored for {phone_number}");
        Some(Session {
            user_name,
            phone_number,
            is_registered,
        })
    }

    /// Remove the stored session and the native phone-number mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if either store fails.
    pub async fn clear(&self) -> Result<()> {
        self.store.multi_remove(&keys::ALL).await?;
        self.native.clear_phone_number().await?;

        info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use crate::preferences::testing::BrokenPreferences;
    use crate::session::{MemoryKeyValueStore, SqliteKeyValueStore};

    fn memory_store() -> (SessionStore, Arc<MemoryKeyValueStore>, Arc<MemoryPreferences>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let prefs = Arc::new(MemoryPreferences::new());
        let store = SessionStore::new(kv.clone(), prefs.clone());
        (store, kv, prefs)
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let (store, _, _) = memory_store();
        let session = Session::registered("Asha", "9876543210");

        store.save(&session).await.unwrap();

        assert_eq!(store.load().await, Some(session));
    }

    #[tokio::test]
    async fn save_mirrors_phone_number() {
        let (store, _, prefs) = memory_store();

        store
            .save(&Session::registered("Asha", "9876543210"))
            .await
            .unwrap();

        assert_eq!(
            prefs.phone_number().await.unwrap().as_deref(),
            Some("9876543210")
        );
    }

    #[tokio::test]
    async fn registration_flag_is_json_encoded() {
        let (store, kv, _) = memory_store();

        store
            .save(&Session::registered("Asha", "9876543210"))
            .await
            .unwrap();

        let values = kv.multi_get(&[keys::IS_REGISTERED]).await.unwrap();
        assert_eq!(values, vec![Some("true".to_string())]);
    }

    #[tokio::test]
    async fn load_after_clear_is_none() {
        let (store, _, prefs) = memory_store();
        store
            .save(&Session::registered("Asha", "9876543210"))
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.load().await, None);
        assert_eq!(prefs.phone_number().await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_session_is_none() {
        let (store, kv, _) = memory_store();
        kv.multi_set(&[
            (keys::USER_NAME, "Asha".to_string()),
            (keys::PHONE_NUMBER, "9876543210".to_string()),
        ])
        .await
        .unwrap();

        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn empty_value_is_none() {
        let (store, kv, _) = memory_store();
        kv.multi_set(&[
            (keys::USER_NAME, String::new()),
            (keys::PHONE_NUMBER, "9876543210".to_string()),
            (keys::IS_REGISTERED, "true".to_string()),
        ])
        .await
        .unwrap();

        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn unreadable_flag_is_none() {
        let (store, kv, _) = memory_store();
        kv.multi_set(&[
            (keys::USER_NAME, "Asha".to_string()),
            (keys::PHONE_NUMBER, "9876543210".to_string()),
            (keys::IS_REGISTERED, "maybe".to_string()),
        ])
        .await
        .unwrap();

        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn mirror_failure_propagates_from_save() {
        let store = SessionStore::new(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(BrokenPreferences),
        );

        let result = store.save(&Session::registered("Asha", "9876543210")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn mirror_failure_propagates_from_clear() {
        let store = SessionStore::new(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(BrokenPreferences),
        );

        assert!(store.clear().await.is_err());
    }

    #[tokio::test]
    async fn works_over_sqlite() {
        let kv = Arc::new(SqliteKeyValueStore::in_memory().await.unwrap());
        let store = SessionStore::new(kv, Arc::new(MemoryPreferences::new()));
        let session = Session::registered("Ravi", "9123456780");

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await, Some(session));

        store.clear().await.unwrap();
        assert_eq!(store.load().await, None);
    }
}
