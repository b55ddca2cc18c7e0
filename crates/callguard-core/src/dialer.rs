//! `tel:` URIs for the platform dialer.
//!
//! Carrier USSD codes are dialled like phone numbers; `#` must be escaped as
//! `%23` or the dialer treats it as a URI fragment.

/// Build a `tel:` URI for an arbitrary dial string.
#[must_use]
pub fn tel_uri(dial: &str) -> String {
    format!("tel:{}", dial.replace('#', "%23"))
}

/// URI that redials a caller.
#[must_use]
pub fn redial_uri(phone_number: &str) -> String {
    tel_uri(phone_number.trim())
}

/// Carrier code toggling unconditional call forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardingCode {
    /// Forward every call to the given number.
    Enable {
        /// Number calls are forwarded to.
        cloud_number: String,
    },
    /// Stop forwarding.
    Disable,
}

impl ForwardingCode {
    /// Forward to `cloud_number`.
    #[must_use]
    pub fn enable(cloud_number: impl Into<String>) -> Self {
        Self::Enable {
            cloud_number: cloud_number.into(),
        }
    }

    /// The code as typed on a keypad.
    #[must_use]
    pub fn dial_string(&self) -> String {
        match self {
            Self::Enable { cloud_number } => format!("**67*{cloud_number}#"),
            Self::Disable => "##67#".to_string(),
        }
    }

    /// The code as a `tel:` URI.
    #[must_use]
    pub fn uri(&self) -> String {
        tel_uri(&self.dial_string())
    }

    /// Alert message when the dialer cannot be opened.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Enable { .. } => "Failed to execute call forwarding",
            Self::Disable => "Failed to disable call forwarding",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redial_is_plain_tel() {
        assert_eq!(redial_uri("9123456780"), "tel:9123456780");
        assert_eq!(redial_uri(" 9123456780 "), "tel:9123456780");
    }

    #[test]
    fn enable_forwarding_escapes_hash() {
        let code = ForwardingCode::enable("8046809151");
        assert_eq!(code.dial_string(), "**67*8046809151#");
        assert_eq!(code.uri(), "tel:**67*8046809151%23");
    }

    #[test]
    fn disable_forwarding_escapes_every_hash() {
        assert_eq!(ForwardingCode::Disable.uri(), "tel:%23%2367%23");
    }
}
