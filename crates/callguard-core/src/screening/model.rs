//! Call-screening event types.

use serde::{Deserialize, Serialize};

/// Caller verification outcome, carried on the wire as 0, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum VerificationStatus {
    /// No verification ran, or the result is unknown.
    #[default]
    Unverified,
    /// The caller passed verification.
    Verified,
    /// The caller failed verification.
    Failed,
}

impl VerificationStatus {
    /// Label shown on the last-call card.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unverified => "Not Verified",
            Self::Verified => "Verified",
            Self::Failed => "Failed Verification",
        }
    }
}

impl From<u8> for VerificationStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Verified,
            2 => Self::Failed,
            _ => Self::Unverified,
        }
    }
}

impl From<VerificationStatus> for u8 {
    fn from(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Unverified => 0,
            VerificationStatus::Verified => 1,
            VerificationStatus::Failed => 2,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A call the native service screened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedCall {
    /// Caller's number.
    pub phone_number: String,
    /// Whether the caller is in the device contacts.
    #[serde(default)]
    pub is_in_contacts: bool,
    /// SIM slot number the call came in on, on dual-SIM devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_number: Option<String>,
    /// What the service did with the call, e.g. `ALLOWED_THROUGH`.
    pub action: String,
    /// Caller verification outcome.
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl ScreenedCall {
    /// The action with underscores shown as spaces.
    #[must_use]
    pub fn action_label(&self) -> String {
        self.action.replace('_', " ")
    }

    /// Contact membership label.
    #[must_use]
    pub const fn contact_label(&self) -> &'static str {
        if self.is_in_contacts {
            "In contacts"
        } else {
            "Not in contacts"
        }
    }
}

/// Answer to a service status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Human-readable status.
    pub message: String,
}

/// Event published by the native screening service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeEvent {
    /// A call was screened.
    CallScreened(ScreenedCall),
}
