//! Login state machine.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::challenge::{DEFAULT_CODE_TTL, OtpChallenge};
use super::validation::{ValidationError, validate_code, validate_name, validate_phone_number};
use crate::Error;
use crate::backend::{BackendClient, SendCodeResponse, UserDetails};
use crate::session::Session;

/// Step of the login wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStep {
    /// Entering a phone number.
    #[default]
    Phone,
    /// Entering the passcode sent to that number.
    Otp,
    /// Choosing a display name (new users only).
    Name,
    /// Done. Terminal.
    Authenticated,
}

/// Verified identity produced by a completed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Verified 10-digit phone number.
    pub phone_number: String,
    /// Whether the backend already knew the user.
    pub existing: bool,
}

impl Identity {
    /// Session to persist for this identity.
    #[must_use]
    pub fn to_session(&self) -> Session {
        Session::registered(self.name.clone(), self.phone_number.clone())
    }
}

/// What a correct passcode led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// New user: a display name is needed.
    NeedsName,
    /// Known user: login is complete.
    Authenticated(Identity),
}

/// Login failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Entered passcode does not match.
    #[error("Invalid OTP. Please try again.")]
    IncorrectCode,

    /// The passcode outlived its TTL.
    #[error("OTP has expired. Please request a new one.")]
    CodeExpired,

    /// The backend rejected the request or could not be reached.
    #[error("{0}")]
    Backend(String),

    /// The action does not apply to the current step.
    #[error("This action is not available right now")]
    WrongStep(LoginStep),

    /// A response arrived for a request the flow has moved past.
    #[error("Response no longer applies")]
    Stale,
}

impl LoginError {
    /// Map a backend failure to a user-facing error.
    ///
    /// Uses the backend's own message when it sent one, else `fallback`.
    #[must_use]
    pub fn from_backend(error: &Error, fallback: &str) -> Self {
        match error {
            Error::Backend { message, .. } if !message.is_empty() => Self::Backend(message.clone()),
            _ => Self::Backend(fallback.to_string()),
        }
    }

    /// Whether this error should be silently dropped.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// A passcode delivery the flow is waiting on.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    generation: u64,
    challenge: OtpChallenge,
}

impl CodeRequest {
    /// Number to deliver the code to.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        self.challenge.phone_number()
    }

    /// Code to deliver.
    #[must_use]
    pub fn code(&self) -> &str {
        self.challenge.code()
    }
}

/// A registration the flow is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRequest {
    generation: u64,
    /// Number to register.
    pub phone_number: String,
    /// Display name to register.
    pub name: String,
}

const SEND_CODE_FALLBACK: &str = "Failed to send OTP. Please try again.";
const REGISTER_FALLBACK: &str = "Failed to register user. Please try again.";

/// Phone → passcode → name wizard.
///
/// Each network leg is split into a `prepare_*` call that validates input and
/// returns a request, and an `apply_*` call that takes the backend result.
/// Results whose request the flow has moved past are rejected with
/// [`LoginError::Stale`] and change nothing.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    step: LoginStep,
    phone_number: String,
    challenge: Option<OtpChallenge>,
    last_code: Option<String>,
    existing_user: Option<UserDetails>,
    identity: Option<Identity>,
    code_ttl: Duration,
    generation: u64,
    in_flight: bool,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_TTL)
    }
}

impl LoginFlow {
    /// Create a flow whose passcodes live for `code_ttl`.
    #[must_use]
    pub const fn new(code_ttl: Duration) -> Self {
        Self {
            step: LoginStep::Phone,
            phone_number: String::new(),
            challenge: None,
            last_code: None,
            existing_user: None,
            identity: None,
            code_ttl,
            generation: 0,
            in_flight: false,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> LoginStep {
        self.step
    }

    /// Normalised phone number the current challenge was sent to.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// The live challenge, if any.
    #[must_use]
    pub const fn challenge(&self) -> Option<&OtpChallenge> {
        self.challenge.as_ref()
    }

    /// Existing user reported by the backend for this number.
    #[must_use]
    pub const fn existing_user(&self) -> Option<&UserDetails> {
        self.existing_user.as_ref()
    }

    /// The verified identity once the flow is complete.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether a network request is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Validate the phone number and issue a fresh challenge for it.
    ///
    /// Allowed from the phone step, and from the passcode step to resend.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a short number, or
    /// [`LoginError::WrongStep`] after the passcode has been accepted.
    pub fn prepare_code(&mut self, phone_input: &str) -> Result<CodeRequest, LoginError> {
        if !matches!(self.step, LoginStep::Phone | LoginStep::Otp) {
            return Err(LoginError::WrongStep(self.step));
        }
        let phone_number = validate_phone_number(phone_input)?;

        let challenge = OtpChallenge::issue(phone_number, self.last_code.as_deref(), self.code_ttl);
        self.last_code = Some(challenge.code().to_string());

        self.generation += 1;
        self.in_flight = true;
        debug!("Issued passcode challenge for {}", challenge.phone_number());

        Ok(CodeRequest {
            generation: self.generation,
            challenge,
        })
    }

    /// Take the backend's answer to a passcode delivery.
    ///
    /// On success the flow moves to the passcode step with the new challenge,
    /// caching the existing user if the backend reported one.
    ///
    /// # Errors
    ///
    /// Returns the backend failure (state unchanged), or
    /// [`LoginError::Stale`] if the flow has moved on.
    pub fn apply_code_sent(
        &mut self,
        request: CodeRequest,
        result: Result<SendCodeResponse, LoginError>,
    ) -> Result<(), LoginError> {
        if request.generation != self.generation
            || !matches!(self.step, LoginStep::Phone | LoginStep::Otp)
        {
            return Err(LoginError::Stale);
        }
        self.in_flight = false;

        let response = result?;
        let CodeRequest { challenge, .. } = request;

        self.existing_user = response
            .existing_user()
            .filter(|user| !user.name.trim().is_empty())
            .cloned();
        if self.existing_user.is_some() {
            debug!("Backend knows {} as an existing user", challenge.phone_number());
        }

        self.phone_number = challenge.phone_number().to_string();
        self.challenge = Some(challenge);
        self.step = LoginStep::Otp;
        Ok(())
    }

    /// Check an entered passcode against the live challenge.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input,
    /// [`LoginError::IncorrectCode`] on mismatch (re-entry is unlimited), or
    /// [`LoginError::CodeExpired`] if the challenge has lapsed.
    pub fn verify_code(&mut self, input: &str) -> Result<VerifyOutcome, LoginError> {
        self.verify_code_at(input, Instant::now())
    }

    /// [`verify_code`](Self::verify_code) against an explicit clock.
    ///
    /// # Errors
    ///
    /// Same as [`verify_code`](Self::verify_code).
    pub fn verify_code_at(&mut self, input: &str, now: Instant) -> Result<VerifyOutcome, LoginError> {
        if self.step != LoginStep::Otp {
            return Err(LoginError::WrongStep(self.step));
        }
        let code = validate_code(input)?;

        let Some(challenge) = self.challenge.as_ref() else {
            return Err(LoginError::CodeExpired);
        };
        if challenge.is_expired_at(now) {
            debug!("Passcode challenge expired");
            self.challenge = None;
            return Err(LoginError::CodeExpired);
        }
        if !challenge.matches(code) {
            return Err(LoginError::IncorrectCode);
        }

        self.challenge = None;
        match self.existing_user.take() {
            Some(user) => {
                let identity = Identity {
                    name: user.name.trim().to_string(),
                    phone_number: self.phone_number.clone(),
                    existing: true,
                };
                info!("Existing user {} verified", identity.phone_number);
                Ok(VerifyOutcome::Authenticated(self.complete(identity)))
            }
            None => {
                self.step = LoginStep::Name;
                Ok(VerifyOutcome::NeedsName)
            }
        }
    }

    /// Return to the phone step, discarding the challenge and any cached user.
    ///
    /// Returns `false` if the flow is not on the passcode step.
    pub fn back_to_phone(&mut self) -> bool {
        if self.step != LoginStep::Otp {
            return false;
        }
        self.step = LoginStep::Phone;
        self.challenge = None;
        self.existing_user = None;
        self.generation += 1;
        self.in_flight = false;
        true
    }

    /// Validate the display name and build the registration request.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or
    /// [`LoginError::WrongStep`] outside the name step.
    pub fn prepare_name(&mut self, name_input: &str) -> Result<NameRequest, LoginError> {
        if self.step != LoginStep::Name {
            return Err(LoginError::WrongStep(self.step));
        }
        let name = validate_name(name_input)?;

        self.generation += 1;
        self.in_flight = true;

        Ok(NameRequest {
            generation: self.generation,
            phone_number: self.phone_number.clone(),
            name: name.to_string(),
        })
    }

    /// Take the backend's answer to a registration.
    ///
    /// # Errors
    ///
    /// Returns the backend failure (state unchanged), or
    /// [`LoginError::Stale`] if the flow has moved on.
    pub fn apply_registered(
        &mut self,
        request: NameRequest,
        result: Result<(), LoginError>,
    ) -> Result<Identity, LoginError> {
        if request.generation != self.generation || self.step != LoginStep::Name {
            return Err(LoginError::Stale);
        }
        self.in_flight = false;
        result?;

        info!("Registered {}", request.phone_number);
        Ok(self.complete(Identity {
            name: request.name,
            phone_number: request.phone_number,
            existing: false,
        }))
    }

    /// Request and deliver a passcode in one call.
    ///
    /// # Errors
    ///
    /// See [`prepare_code`](Self::prepare_code) and
    /// [`apply_code_sent`](Self::apply_code_sent).
    pub async fn send_code(
        &mut self,
        backend: &dyn BackendClient,
        phone_input: &str,
    ) -> Result<(), LoginError> {
        let request = self.prepare_code(phone_input)?;
        let result = deliver_code(backend, &request).await;
        self.apply_code_sent(request, result)
    }

    /// Register the display name in one call.
    ///
    /// # Errors
    ///
    /// See [`prepare_name`](Self::prepare_name) and
    /// [`apply_registered`](Self::apply_registered).
    pub async fn submit_name(
        &mut self,
        backend: &dyn BackendClient,
        name_input: &str,
    ) -> Result<Identity, LoginError> {
        let request = self.prepare_name(name_input)?;
        let result = register_name(backend, &request).await;
        self.apply_registered(request, result)
    }

    fn complete(&mut self, identity: Identity) -> Identity {
        self.step = LoginStep::Authenticated;
        self.challenge = None;
        self.existing_user = None;
        self.identity = Some(identity.clone());
        identity
    }
}

/// Send a passcode for a prepared request, mapping failures for display.
///
/// # Errors
///
/// Returns [`LoginError::Backend`] with the backend's message or a generic one.
pub async fn deliver_code(
    backend: &dyn BackendClient,
    request: &CodeRequest,
) -> Result<SendCodeResponse, LoginError> {
    backend
        .send_code(request.phone_number(), request.code())
        .await
        .map_err(|e| LoginError::from_backend(&e, SEND_CODE_FALLBACK))
}

/// Register a prepared name, mapping failures for display.
///
/// # Errors
///
/// Returns [`LoginError::Backend`] with the backend's message or a generic one.
pub async fn register_name(
    backend: &dyn BackendClient,
    request: &NameRequest,
) -> Result<(), LoginError> {
    backend
        .register(&request.phone_number, &request.name)
        .await
        .map_err(|e| LoginError::from_backend(&e, REGISTER_FALLBACK))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::backend::fake::FakeBackend;

    fn existing_user(name: &str) -> SendCodeResponse {
        SendCodeResponse {
            is_existing_user: true,
            user_details: Some(UserDetails {
                user_id: None,
                name: name.to_string(),
                phone_number: Some("9876543210".to_string()),
            }),
        }
    }

    fn sent_code(flow: &LoginFlow) -> String {
        flow.challenge().unwrap().code().to_string()
    }

    /// A six-digit code guaranteed not to be the live one.
    fn wrong_code(flow: &LoginFlow) -> String {
        if sent_code(flow) == "111111" {
            "222222".to_string()
        } else {
            "111111".to_string()
        }
    }

    #[tokio::test]
    async fn new_user_goes_through_name() {
        let backend = FakeBackend::new();
        let mut flow = LoginFlow::default();

        flow.send_code(&backend, "+91 98765 43210").await.unwrap();
        assert_eq!(flow.step(), LoginStep::Otp);
        assert_eq!(flow.phone_number(), "9876543210");

        let (phone, code) = backend.sent_codes().pop().unwrap();
        assert_eq!(phone, "9876543210");
        assert_eq!(code, sent_code(&flow));

        let outcome = flow.verify_code(&format!(" {code} ")).unwrap();
        assert_eq!(outcome, VerifyOutcome::NeedsName);
        assert_eq!(flow.step(), LoginStep::Name);
        assert!(flow.challenge().is_none());

        let identity = flow.submit_name(&backend, "  Asha ").await.unwrap();
        assert_eq!(identity.name, "Asha");
        assert_eq!(identity.phone_number, "9876543210");
        assert!(!identity.existing);
        assert_eq!(flow.step(), LoginStep::Authenticated);
        assert_eq!(
            backend.registrations(),
            vec![("9876543210".to_string(), "Asha".to_string())]
        );
    }

    #[tokio::test]
    async fn existing_user_completes_on_correct_code() {
        let backend = FakeBackend {
            send_code_response: Some(existing_user("Ravi")),
            ..FakeBackend::new()
        };
        let mut flow = LoginFlow::default();

        flow.send_code(&backend, "9876543210").await.unwrap();
        let code = sent_code(&flow);

        let outcome = flow.verify_code(&code).unwrap();
        let VerifyOutcome::Authenticated(identity) = outcome else {
            panic!("expected authentication");
        };
        assert_eq!(identity.name, "Ravi");
        assert!(identity.existing);
        assert_eq!(flow.identity(), Some(&identity));
        assert_eq!(identity.to_session(), Session::registered("Ravi", "9876543210"));
        assert!(backend.registrations().is_empty());
    }

    #[tokio::test]
    async fn wrong_code_allows_unlimited_retries() {
        let backend = FakeBackend::new();
        let mut flow = LoginFlow::default();
        flow.send_code(&backend, "9876543210").await.unwrap();

        let wrong = wrong_code(&flow);
        for _ in 0..20 {
            assert_eq!(flow.verify_code(&wrong), Err(LoginError::IncorrectCode));
            assert_eq!(flow.step(), LoginStep::Otp);
        }

        let code = sent_code(&flow);
        assert_eq!(flow.verify_code(&code).unwrap(), VerifyOutcome::NeedsName);
    }

    #[tokio::test]
    async fn malformed_code_is_a_validation_error() {
        let backend = FakeBackend::new();
        let mut flow = LoginFlow::default();
        flow.send_code(&backend, "9876543210").await.unwrap();

        assert_eq!(
            flow.verify_code("12345"),
            Err(LoginError::Validation(ValidationError::InvalidCode))
        );
        assert!(flow.challenge().is_some());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_until_resent() {
        let backend = FakeBackend::new();
        let mut flow = LoginFlow::new(Duration::from_secs(30));
        flow.send_code(&backend, "9876543210").await.unwrap();

        let challenge = flow.challenge().unwrap().clone();
        let later = challenge.issued_at() + Duration::from_secs(31);

        assert_eq!(
            flow.verify_code_at(challenge.code(), later),
            Err(LoginError::CodeExpired)
        );
        assert!(flow.challenge().is_none());
        assert_eq!(flow.verify_code(challenge.code()), Err(LoginError::CodeExpired));

        flow.send_code(&backend, "9876543210").await.unwrap();
        let fresh = sent_code(&flow);
        assert_ne!(fresh, challenge.code());
        assert_eq!(flow.verify_code(&fresh).unwrap(), VerifyOutcome::NeedsName);
    }

    #[tokio::test]
    async fn short_number_does_not_leave_phone_step() {
        let backend = FakeBackend::new();
        let mut flow = LoginFlow::default();

        let err = flow.send_code(&backend, "98765").await.unwrap_err();
        assert_eq!(err, LoginError::Validation(ValidationError::InvalidPhoneNumber));
        assert_eq!(flow.step(), LoginStep::Phone);
        assert!(!flow.is_busy());
        assert!(backend.sent_codes().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_keeps_phone_step() {
        let backend = FakeBackend {
            fail_send_code: true,
            ..FakeBackend::new()
        };
        let mut flow = LoginFlow::default();

        let err = flow.send_code(&backend, "9876543210").await.unwrap_err();
        assert_eq!(err, LoginError::Backend("Failed to send OTP".to_string()));
        assert_eq!(flow.step(), LoginStep::Phone);
        assert!(flow.challenge().is_none());
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn registration_failure_keeps_name_step() {
        let backend = FakeBackend {
            fail_register: true,
            ..FakeBackend::new()
        };
        let mut flow = LoginFlow::default();
        flow.send_code(&backend, "9876543210").await.unwrap();
        let code = sent_code(&flow);
        flow.verify_code(&code).unwrap();

        assert_eq!(
            flow.submit_name(&backend, "Asha").await,
            Err(LoginError::Backend("Failed to register user".to_string()))
        );
        assert_eq!(flow.step(), LoginStep::Name);

        assert_eq!(
            flow.submit_name(&backend, "   ").await,
            Err(LoginError::Validation(ValidationError::EmptyName))
        );
    }

    #[tokio::test]
    async fn back_to_phone_discards_challenge_and_user() {
        let backend = FakeBackend {
            send_code_response: Some(existing_user("Ravi")),
            ..FakeBackend::new()
        };
        let mut flow = LoginFlow::default();
        flow.send_code(&backend, "9876543210").await.unwrap();
        let old_code = sent_code(&flow);

        assert!(flow.back_to_phone());
        assert_eq!(flow.step(), LoginStep::Phone);
        assert!(flow.challenge().is_none());
        assert!(flow.existing_user().is_none());
        assert!(!flow.back_to_phone());

        let new_user = FakeBackend::new();
        flow.send_code(&new_user, "9123456780").await.unwrap();
        assert_ne!(sent_code(&flow), old_code);
        let code = sent_code(&flow);
        assert_eq!(flow.verify_code(&code).unwrap(), VerifyOutcome::NeedsName);
    }

    #[test]
    fn stale_code_response_is_ignored() {
        let mut flow = LoginFlow::default();
        let first = flow.prepare_code("9876543210").unwrap();
        let second = flow.prepare_code("9123456780").unwrap();

        assert_eq!(
            flow.apply_code_sent(first, Ok(existing_user("Ravi"))),
            Err(LoginError::Stale)
        );
        assert_eq!(flow.step(), LoginStep::Phone);
        assert!(flow.is_busy());

        flow.apply_code_sent(second, Ok(SendCodeResponse::default()))
            .unwrap();
        assert_eq!(flow.phone_number(), "9123456780");
        assert!(flow.existing_user().is_none());
    }

    #[test]
    fn response_after_back_edge_is_ignored() {
        let mut flow = LoginFlow::default();
        let first = flow.prepare_code("9876543210").unwrap();
        flow.apply_code_sent(first, Ok(SendCodeResponse::default()))
            .unwrap();

        let resend = flow.prepare_code("9876543210").unwrap();
        assert!(flow.back_to_phone());

        assert_eq!(
            flow.apply_code_sent(resend, Ok(SendCodeResponse::default())),
            Err(LoginError::Stale)
        );
        assert_eq!(flow.step(), LoginStep::Phone);
    }

    #[test]
    fn registration_response_after_completion_is_ignored() {
        let mut flow = LoginFlow::default();
        let request = flow.prepare_code("9876543210").unwrap();
        let code = request.code().to_string();
        flow.apply_code_sent(request, Ok(SendCodeResponse::default()))
            .unwrap();
        flow.verify_code(&code).unwrap();

        let name = flow.prepare_name("Asha").unwrap();
        flow.apply_registered(name.clone(), Ok(())).unwrap();

        assert_eq!(flow.apply_registered(name, Ok(())), Err(LoginError::Stale));
        assert_eq!(flow.step(), LoginStep::Authenticated);
    }

    #[test]
    fn terminal_step_rejects_everything() {
        let mut flow = LoginFlow::default();
        let request = flow.prepare_code("9876543210").unwrap();
        let code = request.code().to_string();
        flow.apply_code_sent(request, Ok(existing_user("Ravi")))
            .unwrap();
        flow.verify_code(&code).unwrap();

        assert_eq!(
            flow.prepare_code("9876543210").unwrap_err(),
            LoginError::WrongStep(LoginStep::Authenticated)
        );
        assert!(flow.prepare_name("Asha").is_err());
        assert!(flow.verify_code(&code).is_err());
        assert!(!flow.back_to_phone());
    }

    #[test]
    fn blank_existing_name_falls_back_to_registration() {
        let mut flow = LoginFlow::default();
        let request = flow.prepare_code("9876543210").unwrap();
        let code = request.code().to_string();
        flow.apply_code_sent(request, Ok(existing_user("  "))).unwrap();

        assert_eq!(flow.verify_code(&code).unwrap(), VerifyOutcome::NeedsName);
    }

    #[test]
    fn backend_message_is_preferred() {
        let err = LoginError::from_backend(&Error::backend(400, "Invalid number"), "fallback");
        assert_eq!(err.to_string(), "Invalid number");

        let err = LoginError::from_backend(&Error::Bridge("x".into()), "fallback");
        assert_eq!(err.to_string(), "fallback");
    }

    proptest! {
        #[test]
        fn each_send_issues_a_fresh_code(sends in 2usize..8) {
            let mut flow = LoginFlow::default();
            let mut previous: Option<String> = None;
            for _ in 0..sends {
                let request = flow.prepare_code("9876543210").unwrap();
                let code = request.code().to_string();
                prop_assert_eq!(code.len(), 6);
                prop_assert_ne!(Some(&code), previous.as_ref());
                flow.apply_code_sent(request, Ok(SendCodeResponse::default())).unwrap();
                previous = Some(code);
            }
        }

        #[test]
        fn only_the_latest_code_verifies(entered in "[0-9]{6}") {
            let mut flow = LoginFlow::default();
            let request = flow.prepare_code("9876543210").unwrap();
            let code = request.code().to_string();
            flow.apply_code_sent(request, Ok(SendCodeResponse::default())).unwrap();

            let result = flow.verify_code(&entered);
            if entered == code {
                prop_assert_eq!(result, Ok(VerifyOutcome::NeedsName));
            } else {
                prop_assert_eq!(result, Err(LoginError::IncorrectCode));
                prop_assert_eq!(flow.step(), LoginStep::Otp);
            }
        }
    }
}
