//! One-time passcode challenge.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;

/// Default lifetime of a passcode.
pub const DEFAULT_CODE_TTL: Duration = Duration::from_secs(10 * 60);

/// A passcode issued for one phone number.
///
/// Lives only inside the login flow and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    phone_number: String,
    code: String,
    issued_at: Instant,
    ttl: Duration,
}

impl OtpChallenge {
    /// Issue a challenge with a fresh random code.
    ///
    /// The code never equals `previous_code`.
    #[must_use]
    pub fn issue(phone_number: impl Into<String>, previous_code: Option<&str>, ttl: Duration) -> Self {
        Self {
            phone_number: phone_number.into(),
            code: generate_code(previous_code),
            issued_at: Instant::now(),
            ttl,
        }
    }

    /// Phone number the code was sent to.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// The six-digit code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// When the challenge was issued.
    #[must_use]
    pub const fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Whether the challenge has outlived its TTL at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) > self.ttl
    }

    /// Whether `entered` equals the code.
    #[must_use]
    pub fn matches(&self, entered: &str) -> bool {
        self.code == entered
    }
}

impl fmt::Debug for OtpChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpChallenge")
            .field("phone_number", &self.phone_number)
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn generate_code(previous: Option<&str>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code = rng.gen_range(100_000..1_000_000).to_string();
        if previous != Some(code.as_str()) {
            return code;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn code_is_six_digits() {
        let challenge = OtpChallenge::issue("9876543210", None, DEFAULT_CODE_TTL);
        assert_eq!(challenge.code().len(), 6);
        assert!(challenge.code().bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(challenge.phone_number(), "9876543210");
    }

    #[test]
    fn expires_after_ttl() {
        let challenge = OtpChallenge::issue("9876543210", None, Duration::from_secs(60));
        let issued = challenge.issued_at();

        assert!(!challenge.is_expired_at(issued));
        assert!(!challenge.is_expired_at(issued + Duration::from_secs(60)));
        assert!(challenge.is_expired_at(issued + Duration::from_secs(61)));
    }

    #[test]
    fn debug_hides_code() {
        let challenge = OtpChallenge::issue("9876543210", None, DEFAULT_CODE_TTL);
        let debug = format!("{challenge:?}");
        assert!(debug.contains(r#"code: "******""#));
    }

    proptest! {
        #[test]
        fn fresh_code_differs_from_previous(previous in 100_000u32..1_000_000) {
            let previous = previous.to_string();
            let challenge = OtpChallenge::issue("9876543210", Some(&previous), DEFAULT_CODE_TTL);
            prop_assert_ne!(challenge.code(), previous.as_str());
            prop_assert_eq!(challenge.code().len(), 6);
            prop_assert!(!challenge.code().starts_with('0'));
        }
    }
}
