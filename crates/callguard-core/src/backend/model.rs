//! Backend wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /sendWhatsappMsg`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCodeRequest<'a> {
    pub phone_number: &'a str,
    pub otp: &'a str,
}

/// Body of `POST /registerUser`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest<'a> {
    pub phone_number: &'a str,
    pub name: &'a str,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply to a passcode request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    /// Whether the phone number already belongs to a registered user.
    #[serde(default)]
    pub is_existing_user: bool,
    /// The existing user's details, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
}

impl SendCodeResponse {
    /// The existing user's details, if the backend flagged one.
    #[must_use]
    pub fn existing_user(&self) -> Option<&UserDetails> {
        if self.is_existing_user {
            self.user_details.as_ref()
        } else {
            None
        }
    }
}

/// A registered user as the backend describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// Backend user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name. Blank when the backend omits it.
    #[serde(default)]
    pub name: String,
    /// Phone number on record.
    #[serde(default)]
    pub phone_number: Option<String>,
}
