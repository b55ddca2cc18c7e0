//! Session model types.

use serde::{Deserialize, Serialize};

/// The locally persisted identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Display name chosen at registration.
    pub user_name: String,
    /// Verified 10-digit phone number. Doubles as the backend user id.
    pub phone_number: String,
    /// Whether the backend knows this user.
    pub is_registered: bool,
}

impl Session {
    /// Create a session for a user the backend has registered.
    #[must_use]
    pub fn registered(user_name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            phone_number: phone_number.into(),
            is_registered: true,
        }
    }

    /// Identifier used for backend conversation lookups.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.phone_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_sets_flag() {
        let session = Session::registered("Asha", "9876543210");
        assert_eq!(session.user_name, "Asha");
        assert_eq!(session.phone_number, "9876543210");
        assert!(session.is_registered);
    }

    #[test]
    fn user_id_is_phone_number() {
        let session = Session::registered("Asha", "9876543210");
        assert_eq!(session.user_id(), "9876543210");
    }
}
