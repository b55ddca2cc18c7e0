//! `CallGuard` - desktop client for AI call screening
//!
//! Built with Rust and the iced GUI framework. Login, session storage,
//! backend calls and the screening bridge live in `callguard-core`; this
//! crate renders the state and runs the async work it asks for.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod message;
mod model;
mod style;
mod view;

use anyhow::Context;
use callguard_core::{
    Alert, AppConfig, AppState, Effect, ForwardingCode, Phase, ScreenedCall, Services, redial_uri,
};
use iced::futures::stream;
use iced::{Element, Task, task};
use notify_rust::Notification;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use message::{LoginMessage, Message, SettingsMessage};
use model::LoginForm;

fn main() -> iced::Result {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callguard=debug,callguard_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CallGuard");

    iced::application(CallGuard::new, CallGuard::update, CallGuard::view)
        .title("CallGuard")
        .run()
}

/// Main application state.
#[derive(Default)]
struct CallGuard {
    /// Everything the screens render.
    state: AppState,
    /// Stores, backend and bridge; absent until startup finishes.
    services: Option<Services>,
    /// Loaded configuration.
    config: AppConfig,
    /// Text typed into the login wizard.
    form: LoginForm,
    /// Running screened-call listener.
    screening: Option<task::Handle>,
}

impl CallGuard {
    /// Create the application and start opening the stores.
    fn new() -> (Self, Task<Message>) {
        (
            Self::default(),
            Task::perform(open_services(), Message::ServicesOpened),
        )
    }

    /// Handle a message and return the follow-up task.
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ServicesOpened(Ok((config, services))) => {
                self.state = AppState::new(config.otp_ttl());
                self.config = config;
                self.services = Some(services.clone());
                return Task::perform(
                    async move { services.hydrate().await },
                    Message::Hydrated,
                );
            }
            Message::ServicesOpened(Err(e)) => {
                warn!("Startup failed: {e}");
                self.state.show_alert(Alert::error(e));
            }
            Message::Hydrated(hydrated) => {
                let effects = self.state.hydrated(hydrated);
                return self.run_effects(effects);
            }

            Message::Login(login_msg) => return self.handle_login(login_msg),
            Message::PhoneHint(Ok(number)) => self.form.set_phone(&number),
            Message::PhoneHint(Err(alert)) => self.state.show_alert(alert),
            Message::CodeSent(request, result) => {
                if result.is_ok() {
                    self.form.set_code("");
                }
                let effects = self.state.code_sent(request, result);
                return self.run_effects(effects);
            }
            Message::Registered(request, result) => {
                let effects = self.state.registered(request, result);
                return self.run_effects(effects);
            }
            Message::LoginPersisted(session, result) => {
                let effects = self.state.login_persisted(session, result);
                if self.state.phase() == Phase::Home {
                    self.form = LoginForm::new();
                }
                return self.run_effects(effects);
            }

            Message::Refresh => {
                let effects = self.state.refresh();
                return self.run_effects(effects);
            }
            Message::ConversationsLoaded {
                user_id,
                result,
                announce,
            } => {
                self.state.conversations_loaded(&user_id, result, announce);
            }
            Message::ToggleConversation(key) => self.state.toggle_conversation(&key),
            Message::Redial(number) => {
                self.open_dialer(&redial_uri(&number), "Failed to open dialer");
            }
            Message::CallScreened(call) => {
                if self.state.phase() == Phase::Home {
                    notify_screened_call(&call);
                }
                self.state.call_screened(call);
            }
            Message::ScreeningStreamEnded => {
                debug!("Screened-call stream ended");
                self.screening = None;
            }

            Message::OpenSettings => self.state.open_settings(),
            Message::CloseSettings => self.state.close_settings(),
            Message::Settings(settings_msg) => return self.handle_settings(settings_msg),
            Message::ScreeningToggled(enabled, result) => {
                self.state.screening_toggled(enabled, result);
            }
            Message::RoleRequested(result) => self.state.role_requested(result),
            Message::StatusChecked(result) => self.state.status_checked(result),
            Message::LoggedOut(result) => {
                let effects = self.state.logged_out(result);
                if self.state.phase() == Phase::Login {
                    self.form = LoginForm::new();
                }
                return self.run_effects(effects);
            }

            Message::DismissAlert => self.state.dismiss_alert(),
        }
        Task::none()
    }

    /// Handle login form messages.
    fn handle_login(&mut self, message: LoginMessage) -> Task<Message> {
        let busy = self.state.login().is_busy();

        match message {
            LoginMessage::PhoneChanged(value) => self.form.set_phone(&value),
            LoginMessage::AutoFill => {
                if let Some(services) = self.services.clone() {
                    return Task::perform(
                        async move { services.phone_hint().await },
                        Message::PhoneHint,
                    );
                }
            }
            LoginMessage::CodeChanged(value) => self.form.set_code(&value),
            LoginMessage::NameChanged(value) => self.form.set_name(value),
            LoginMessage::SubmitPhone if !busy => {
                let effects = self.state.submit_phone(&self.form.phone);
                return self.run_effects(effects);
            }
            LoginMessage::SubmitCode => {
                let effects = self.state.submit_code(&self.form.code);
                return self.run_effects(effects);
            }
            LoginMessage::Resend if !busy => {
                let phone_number = self.state.login().phone_number().to_string();
                let effects = self.state.submit_phone(&phone_number);
                return self.run_effects(effects);
            }
            LoginMessage::Back => {
                self.state.back_to_phone();
                self.form.set_code("");
            }
            LoginMessage::SubmitName if !busy => {
                let effects = self.state.submit_name(&self.form.name);
                return self.run_effects(effects);
            }
            LoginMessage::SubmitPhone | LoginMessage::Resend | LoginMessage::SubmitName => {
                debug!("Ignoring login submit while a request is in flight");
            }
        }
        Task::none()
    }

    /// Handle settings panel messages.
    fn handle_settings(&mut self, message: SettingsMessage) -> Task<Message> {
        match message {
            SettingsMessage::EnableForwarding => {
                let code = ForwardingCode::enable(self.config.cloud_number.clone());
                self.open_dialer(&code.uri(), code.failure_message());
                return Task::none();
            }
            SettingsMessage::DisableForwarding => {
                let code = ForwardingCode::Disable;
                self.open_dialer(&code.uri(), code.failure_message());
                return Task::none();
            }
            _ => {}
        }

        let Some(services) = self.services.clone() else {
            return Task::none();
        };

        match message {
            SettingsMessage::ToggleScreening(enabled) => Task::perform(
                async move { services.set_screening_enabled(enabled).await },
                move |result| Message::ScreeningToggled(enabled, result),
            ),
            SettingsMessage::RequestRole => Task::perform(
                async move { services.request_role().await },
                Message::RoleRequested,
            ),
            SettingsMessage::CheckStatus => Task::perform(
                async move { services.check_service_status().await },
                Message::StatusChecked,
            ),
            SettingsMessage::Logout => {
                Task::perform(async move { services.logout().await }, Message::LoggedOut)
            }
            SettingsMessage::EnableForwarding | SettingsMessage::DisableForwarding => Task::none(),
        }
    }

    /// Run the effects a reducer returned.
    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let Some(services) = self.services.clone() else {
            return Task::none();
        };

        let mut tasks = Vec::with_capacity(effects.len());
        for effect in effects {
            tasks.push(self.run_effect(&services, effect));
        }
        Task::batch(tasks)
    }

    fn run_effect(&mut self, services: &Services, effect: Effect) -> Task<Message> {
        let services = services.clone();

        match effect {
            Effect::SendCode(request) => Task::perform(
                async move {
                    let result = services.send_code(&request).await;
                    (request, result)
                },
                |(request, result)| Message::CodeSent(request, result),
            ),
            Effect::Register(request) => Task::perform(
                async move {
                    let result = services.register(&request).await;
                    (request, result)
                },
                |(request, result)| Message::Registered(request, result),
            ),
            Effect::PersistLogin(session) => Task::perform(
                async move {
                    let result = services.persist_login(&session).await;
                    (session, result)
                },
                |(session, result)| Message::LoginPersisted(session, result),
            ),
            Effect::FetchConversations { user_id, announce } => Task::perform(
                async move {
                    let result = services.fetch_conversations(&user_id).await;
                    (user_id, result)
                },
                move |(user_id, result)| Message::ConversationsLoaded {
                    user_id,
                    result,
                    announce,
                },
            ),
            Effect::WatchScreenedCalls => self.watch_screened_calls(&services),
            Effect::StopWatchingScreenedCalls => {
                if let Some(handle) = self.screening.take() {
                    info!("Stopped listening for screened calls");
                    handle.abort();
                }
                Task::none()
            }
        }
    }

    /// Forward bridge events as messages until aborted.
    ///
    /// Calls that piled up while the last one was handled collapse to the
    /// newest.
    fn watch_screened_calls(&mut self, services: &Services) -> Task<Message> {
        if let Some(previous) = self.screening.take() {
            previous.abort();
        }

        let calls = stream::unfold(services.subscribe(), |mut subscription| async move {
            let call = subscription.next().await?;
            let newest = subscription.latest().unwrap_or(call);
            Some((newest, subscription))
        });
        let (task, handle) = Task::run(calls, Message::CallScreened)
            .chain(Task::done(Message::ScreeningStreamEnded))
            .abortable();

        info!("Listening for screened calls");
        self.screening = Some(handle);
        task
    }

    /// Hand a `tel:` URI to the platform, alerting on failure.
    fn open_dialer(&mut self, uri: &str, failure: &str) {
        debug!("Opening dialer with {uri}");
        if let Err(e) = opener::open(uri) {
            warn!("Failed to open {uri}: {e}");
            self.state.show_alert(Alert::error(failure));
        }
    }

    /// Render the current screen with any open panel and alert on top.
    fn view(&self) -> Element<'_, Message> {
        let mut screen = match self.state.phase() {
            Phase::Loading => view::view_loading(),
            Phase::Login => {
                view::view_login(self.state.login(), &self.form, self.state.field_error())
            }
            Phase::Home => view::view_home(&self.state),
        };

        if self.state.settings_open() {
            screen = view::modal(
                screen,
                view::view_settings(self.state.screening_enabled()),
                Message::CloseSettings,
            );
        }

        match self.state.alert() {
            Some(alert) => view::modal(screen, view::view_alert(alert), Message::DismissAlert),
            None => screen,
        }
    }
}

/// Load the config and open the stores, backend and bridge.
async fn open_services() -> Result<(AppConfig, Services), String> {
    let opened: anyhow::Result<_> = async {
        let config = AppConfig::load().await.context("Failed to load config")?;
        let services = Services::open(&config)
            .await
            .context("Failed to open local storage")?;
        Ok((config, services))
    }
    .await;
    opened.map_err(|e| format!("{e:#}"))
}

/// Show a desktop notification for a screened call.
fn notify_screened_call(call: &ScreenedCall) {
    let body = format!(
        "{}\n{} \u{b7} {}",
        call.phone_number,
        call.action_label(),
        call.verification_status
    );
    if let Err(e) = Notification::new()
        .appname("CallGuard")
        .summary("Call screened")
        .body(&body)
        .show()
    {
        warn!("Failed to show desktop notification: {e}");
    }
}
