//! Application state and its reducers.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info};

use super::alert::Alert;
use crate::backend::SendCodeResponse;
use crate::conversation::ConversationHistory;
use crate::login::{
    CodeRequest, LoginError, LoginFlow, LoginStep, NameRequest, ValidationError, VerifyOutcome,
};
use crate::screening::{ScreenedCall, ServiceStatus};
use crate::session::Session;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Restoring the stored session.
    #[default]
    Loading,
    /// No session: the login wizard is shown.
    Login,
    /// Logged in.
    Home,
}

/// What startup found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated {
    /// The stored session, if complete.
    pub session: Option<Session>,
    /// Stored screening flag.
    pub screening_enabled: bool,
}

/// Async work a reducer asks the shell to run.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Deliver a passcode.
    SendCode(CodeRequest),
    /// Register a new user.
    Register(NameRequest),
    /// Save the session of a completed login.
    PersistLogin(Session),
    /// Load conversation history.
    FetchConversations {
        /// Backend user id.
        user_id: String,
        /// Announce completion with an alert.
        announce: bool,
    },
    /// Start listening for screened calls.
    WatchScreenedCalls,
    /// Stop listening for screened calls.
    StopWatchingScreenedCalls,
}

/// Everything the UI shows, mutated only through the methods below.
///
/// Exactly one of "no session" and "valid session" holds: the session is
/// present iff the phase is [`Phase::Home`].
#[derive(Debug, Clone)]
pub struct AppState {
    phase: Phase,
    session: Option<Session>,
    login: LoginFlow,
    field_error: Option<ValidationError>,
    screening_enabled: bool,
    last_call: Option<ScreenedCall>,
    conversations: ConversationHistory,
    expanded: HashSet<String>,
    settings_open: bool,
    refreshing: bool,
    alert: Option<Alert>,
    code_ttl: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::login::DEFAULT_CODE_TTL)
    }
}

impl AppState {
    /// Fresh state in the loading phase.
    #[must_use]
    pub fn new(code_ttl: Duration) -> Self {
        Self {
            phase: Phase::Loading,
            session: None,
            login: LoginFlow::new(code_ttl),
            field_error: None,
            screening_enabled: true,
            last_call: None,
            conversations: ConversationHistory::default(),
            expanded: HashSet::new(),
            settings_open: false,
            refreshing: false,
            alert: None,
            code_ttl,
        }
    }

    /// Current screen.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The logged-in session.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The login wizard.
    #[must_use]
    pub const fn login(&self) -> &LoginFlow {
        &self.login
    }

    /// Validation error to show under the login input.
    #[must_use]
    pub const fn field_error(&self) -> Option<ValidationError> {
        self.field_error
    }

    /// Whether call screening is enabled.
    #[must_use]
    pub const fn screening_enabled(&self) -> bool {
        self.screening_enabled
    }

    /// Most recent screened call.
    #[must_use]
    pub const fn last_call(&self) -> Option<&ScreenedCall> {
        self.last_call.as_ref()
    }

    /// Conversation history, newest first.
    #[must_use]
    pub const fn conversations(&self) -> &ConversationHistory {
        &self.conversations
    }

    /// Whether a conversation's transcript is expanded.
    #[must_use]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Whether the settings panel is open.
    #[must_use]
    pub const fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// Whether a user-requested refresh is running.
    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// The alert being shown.
    #[must_use]
    pub const fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    // Startup

    /// Apply what startup loaded.
    pub fn hydrated(&mut self, hydrated: Hydrated) -> Vec<Effect> {
        self.screening_enabled = hydrated.screening_enabled;
        info!(
            "Call screening {}",
            if hydrated.screening_enabled { "enabled" } else { "disabled" }
        );
        match hydrated.session {
            Some(session) if session.is_registered => {
                info!("Restored session for {}", session.phone_number);
                self.enter_home(session)
            }
            Some(session) => {
                info!("Stored session for {} is unregistered", session.phone_number);
                self.phase = Phase::Login;
                Vec::new()
            }
            None => {
                self.phase = Phase::Login;
                Vec::new()
            }
        }
    }

    // Login

    /// Submit the phone number.
    pub fn submit_phone(&mut self, input: &str) -> Vec<Effect> {
        if self.phase != Phase::Login {
            return Vec::new();
        }
        self.field_error = None;
        match self.login.prepare_code(input) {
            Ok(request) => vec![Effect::SendCode(request)],
            Err(e) => self.login_failed(&e),
        }
    }

    /// Take the result of a passcode delivery.
    pub fn code_sent(
        &mut self,
        request: CodeRequest,
        result: Result<SendCodeResponse, LoginError>,
    ) -> Vec<Effect> {
        if let Err(e) = self.login.apply_code_sent(request, result) {
            return self.login_failed(&e);
        }
        Vec::new()
    }

    /// Submit the passcode.
    pub fn submit_code(&mut self, input: &str) -> Vec<Effect> {
        self.field_error = None;
        match self.login.verify_code(input) {
            Ok(VerifyOutcome::NeedsName) => Vec::new(),
            Ok(VerifyOutcome::Authenticated(identity)) => {
                vec![Effect::PersistLogin(identity.to_session())]
            }
            Err(e) => self.login_failed(&e),
        }
    }

    /// Leave the passcode step.
    pub fn back_to_phone(&mut self) {
        self.field_error = None;
        self.login.back_to_phone();
    }

    /// Submit the display name.
    pub fn submit_name(&mut self, input: &str) -> Vec<Effect> {
        self.field_error = None;
        match self.login.prepare_name(input) {
            Ok(request) => vec![Effect::Register(request)],
            Err(e) => self.login_failed(&e),
        }
    }

    /// Take the result of a registration.
    pub fn registered(&mut self, request: NameRequest, result: Result<(), LoginError>) -> Vec<Effect> {
        match self.login.apply_registered(request, result) {
            Ok(identity) => vec![Effect::PersistLogin(identity.to_session())],
            Err(e) => self.login_failed(&e),
        }
    }

    /// Take the result of saving a completed login.
    ///
    /// A session that could not be saved is not entered; the wizard restarts.
    pub fn login_persisted(&mut self, session: Session, result: Result<(), Alert>) -> Vec<Effect> {
        if self.phase != Phase::Login || self.login.step() != LoginStep::Authenticated {
            debug!("Ignoring login persistence result outside the login phase");
            return Vec::new();
        }
        match result {
            Ok(()) => self.enter_home(session),
            Err(alert) => {
                self.login = LoginFlow::new(self.code_ttl);
                self.alert = Some(alert);
                Vec::new()
            }
        }
    }

    // Home

    /// Take the result of logging out.
    pub fn logged_out(&mut self, result: Result<(), Alert>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.phase = Phase::Login;
                self.session = None;
                self.login = LoginFlow::new(self.code_ttl);
                self.field_error = None;
                self.last_call = None;
                self.conversations = ConversationHistory::default();
                self.expanded.clear();
                self.settings_open = false;
                self.refreshing = false;
                self.alert = Some(Alert::success("Success", "Logged out successfully"));
                info!("User logged out");
                vec![Effect::StopWatchingScreenedCalls]
            }
            Err(alert) => {
                self.alert = Some(alert);
                Vec::new()
            }
        }
    }

    /// Take the result of changing the screening flag.
    pub fn screening_toggled(&mut self, enabled: bool, result: Result<(), Alert>) {
        match result {
            Ok(()) => {
                self.screening_enabled = enabled;
                let state = if enabled { "enabled" } else { "disabled" };
                self.alert = Some(Alert::success(
                    "Call Screening",
                    format!("Call screening {state}"),
                ));
            }
            Err(alert) => self.alert = Some(alert),
        }
    }

    /// Start a user-requested refresh of the history.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.refreshing {
            return Vec::new();
        }
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        self.refreshing = true;
        vec![Effect::FetchConversations {
            user_id: session.user_id().to_string(),
            announce: true,
        }]
    }

    /// Take fetched conversation history for `user_id`.
    ///
    /// History fetched for anyone but the current session is dropped.
    pub fn conversations_loaded(
        &mut self,
        user_id: &str,
        result: Result<ConversationHistory, Alert>,
        announce: bool,
    ) {
        if self.session.as_ref().is_none_or(|session| session.user_id() != user_id) {
            debug!("Dropping conversation history fetched for {user_id}");
            return;
        }
        if announce {
            self.refreshing = false;
        }
        match result {
            Ok(history) => {
                self.expanded.retain(|key| history.get(key).is_some());
                self.conversations = history;
                if announce {
                    self.alert = Some(Alert::success("Success", "Conversations refreshed"));
                }
            }
            Err(alert) => self.alert = Some(alert),
        }
    }

    /// Record a screened call.
    pub fn call_screened(&mut self, call: ScreenedCall) {
        if self.phase == Phase::Home {
            self.last_call = Some(call);
        }
    }

    /// Take the platform's answer to a role request.
    pub fn role_requested(&mut self, result: Result<String, Alert>) {
        self.alert = Some(match result {
            Ok(message) => Alert::info("Call Screening", message),
            Err(alert) => alert,
        });
    }

    /// Take a service status report.
    pub fn status_checked(&mut self, result: Result<ServiceStatus, Alert>) {
        self.alert = Some(match result {
            Ok(status) => Alert::info("Service Status", status.message),
            Err(alert) => alert,
        });
    }

    /// Expand or collapse a conversation transcript.
    pub fn toggle_conversation(&mut self, key: &str) {
        if !self.expanded.remove(key) {
            self.expanded.insert(key.to_string());
        }
    }

    /// Open the settings panel.
    pub fn open_settings(&mut self) {
        if self.phase == Phase::Home {
            self.settings_open = true;
        }
    }

    /// Close the settings panel.
    pub fn close_settings(&mut self) {
        self.settings_open = false;
    }

    // Alerts

    /// Show an alert, replacing any current one.
    pub fn show_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    /// Dismiss the current alert.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn enter_home(&mut self, session: Session) -> Vec<Effect> {
        let user_id = session.user_id().to_string();
        self.session = Some(session);
        self.phase = Phase::Home;
        vec![
            Effect::FetchConversations {
                user_id,
                announce: false,
            },
            Effect::WatchScreenedCalls,
        ]
    }

    fn login_failed(&mut self, error: &LoginError) -> Vec<Effect> {
        match error {
            LoginError::Stale => debug!("Dropping stale login response"),
            LoginError::Validation(invalid) => self.field_error = Some(*invalid),
            _ => self.alert = Some(Alert::error(error.to_string())),
        }
        Vec::new()
    }
}
