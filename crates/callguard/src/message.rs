//! Message types for application events.
//!
//! In the Elm architecture, Messages are events that trigger state changes.

use callguard_core::{
    Alert, AppConfig, CodeRequest, ConversationHistory, Hydrated, LoginError, NameRequest,
    ScreenedCall, SendCodeResponse, ServiceStatus, Services, Session,
};

/// Application messages (events).
#[derive(Debug, Clone)]
pub enum Message {
    // Startup
    /// Config loaded and stores opened.
    ServicesOpened(Result<(AppConfig, Services), String>),
    /// Stored session and preferences loaded.
    Hydrated(Hydrated),

    // Login
    /// Login form messages.
    Login(LoginMessage),
    /// Device phone number read for auto-fill.
    PhoneHint(Result<String, Alert>),
    /// Passcode delivery finished.
    CodeSent(CodeRequest, Result<SendCodeResponse, LoginError>),
    /// Registration finished.
    Registered(NameRequest, Result<(), LoginError>),
    /// The completed login was saved (or not).
    LoginPersisted(Session, Result<(), Alert>),

    // Home
    /// Reload conversation history.
    Refresh,
    /// Conversation history fetched.
    ConversationsLoaded {
        /// Whose history was fetched.
        user_id: String,
        /// Fetched history or an error alert.
        result: Result<ConversationHistory, Alert>,
        /// Whether the user asked for this refresh.
        announce: bool,
    },
    /// Expand or collapse a transcript.
    ToggleConversation(String),
    /// Call a number back.
    Redial(String),
    /// A screened call arrived from the bridge.
    CallScreened(ScreenedCall),
    /// The screened-call stream ended.
    ScreeningStreamEnded,

    // Settings
    /// Show the settings panel.
    OpenSettings,
    /// Hide the settings panel.
    CloseSettings,
    /// Settings panel messages.
    Settings(SettingsMessage),
    /// Screening flag stored.
    ScreeningToggled(bool, Result<(), Alert>),
    /// Role request answered.
    RoleRequested(Result<String, Alert>),
    /// Status check answered.
    StatusChecked(Result<ServiceStatus, Alert>),
    /// Session cleared.
    LoggedOut(Result<(), Alert>),

    /// Close the alert overlay.
    DismissAlert,
}

/// Login form messages.
#[derive(Debug, Clone)]
pub enum LoginMessage {
    /// Phone number field changed.
    PhoneChanged(String),
    /// Fill the phone number from the device.
    AutoFill,
    /// Passcode field changed.
    CodeChanged(String),
    /// Name field changed.
    NameChanged(String),
    /// Request a passcode.
    SubmitPhone,
    /// Check the passcode.
    SubmitCode,
    /// Request a new passcode.
    Resend,
    /// Go back to the phone number.
    Back,
    /// Register the name.
    SubmitName,
}

/// Settings panel messages.
#[derive(Debug, Clone)]
pub enum SettingsMessage {
    /// Screening switch flipped.
    ToggleScreening(bool),
    /// Ask for the call-screening role.
    RequestRole,
    /// Ask whether the screening service runs.
    CheckStatus,
    /// Forward calls to the cloud number.
    EnableForwarding,
    /// Stop forwarding calls.
    DisableForwarding,
    /// Log out.
    Logout,
}
