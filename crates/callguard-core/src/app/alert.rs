//! Blocking alert shown by the shell.

use crate::Error;

/// Tone of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Something failed.
    Error,
    /// An action completed.
    Success,
    /// Neutral information.
    Info,
}

/// A modal message with a single dismiss action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Tone.
    pub kind: AlertKind,
}

impl Alert {
    /// An error titled "Error".
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            kind: AlertKind::Error,
        }
    }

    /// A success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: AlertKind::Success,
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: AlertKind::Info,
        }
    }

    /// Error alert for a failed operation.
    ///
    /// Messages from the backend or the screening bridge are shown as-is;
    /// anything else shows `fallback`.
    #[must_use]
    pub fn from_error(error: &Error, fallback: &str) -> Self {
        let message = match error {
            Error::Backend { message, .. } | Error::Bridge(message) if !message.is_empty() => {
                message.as_str()
            }
            _ => fallback,
        };
        Self::error(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_uses_remote_message() {
        let alert = Alert::from_error(&Error::Bridge("Role denied".into()), "fallback");
        assert_eq!(alert.message, "Role denied");
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.kind, AlertKind::Error);
    }

    #[test]
    fn error_falls_back_for_local_failures() {
        let io = std::io::Error::other("disk full");
        let alert = Alert::from_error(&Error::Io(io), "Failed to logout. Please try again.");
        assert_eq!(alert.message, "Failed to logout. Please try again.");
    }
}
