//! Application aggregate: screens, event routing, and the auth form.
//!
//! `App` wires the session store, the analysis controller, and the history
//! browser to one event channel. Spawned gateway tasks send completions;
//! `tick` drains them and applies every state transition on the event-loop
//! thread, which is what keeps the three asynchronous sources (analyze,
//! history, auth) from ever racing each other over shared state.

use smelter_gateway::Gateway;
use smelter_types::Credential;

use crate::controller::AnalysisController;
use crate::errors::{self, AuthError};
use crate::events::{self, AuthIntent, SessionEvent, SessionReceiver, SessionSender};
use crate::history::HistoryBrowser;
use crate::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
}

/// Input state of the login/signup form.
#[derive(Debug, Default)]
pub struct AuthForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub focus: Option<AuthField>,
    pub error: Option<String>,
    /// An auth call is outstanding; the submit action is disabled.
    pub busy: bool,
}

impl AuthForm {
    fn focused(&self) -> AuthField {
        self.focus.unwrap_or(AuthField::Username)
    }

    pub fn push_char(&mut self, ch: char) {
        match self.focused() {
            AuthField::Username => self.username.push(ch),
            AuthField::Email => self.email.push(ch),
            AuthField::Password => self.password.push(ch),
        }
    }

    pub fn backspace(&mut self) {
        let field = match self.focused() {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        };
        field.pop();
    }

    /// Advance focus through the fields the screen actually shows.
    pub fn next_field(&mut self, screen: Screen) {
        self.focus = Some(match (self.focused(), screen) {
            (AuthField::Username, Screen::Signup) => AuthField::Email,
            (AuthField::Username, _) | (AuthField::Email, _) => AuthField::Password,
            (AuthField::Password, _) => AuthField::Username,
        });
    }
}

#[derive(Debug)]
pub struct App {
    gateway: Gateway,
    pub session: SessionStore,
    pub controller: AnalysisController,
    pub history: HistoryBrowser,
    pub screen: Screen,
    pub form: AuthForm,
    status: Option<String>,
    events_tx: SessionSender,
    events_rx: SessionReceiver,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(gateway: Gateway, session: SessionStore) -> Self {
        let (events_tx, events_rx) = events::channel();
        let screen = if session.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        Self {
            gateway,
            session,
            controller: AnalysisController::new(),
            history: HistoryBrowser::new(),
            screen,
            form: AuthForm::default(),
            status: None,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }

    #[must_use]
    pub fn status_line(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    /// Drain finished background work and apply the transitions.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AnalyzeDone { generation, result } => {
                self.controller
                    .on_analyze_done(self.gateway.base_url(), generation, result);
            }
            SessionEvent::HistoryLoaded { result } => {
                self.history.on_loaded(result);
            }
            SessionEvent::AuthDone { intent, result } => {
                self.form.busy = false;
                match result {
                    Ok(credential) => self.finish_auth(intent, credential),
                    Err(err) => {
                        self.form.error =
                            Some(errors::auth_failure_message(self.gateway.base_url(), &err));
                    }
                }
            }
        }
    }

    fn finish_auth(&mut self, intent: AuthIntent, credential: Credential) {
        let username = credential.username().to_string();
        self.session.install(credential);
        self.form = AuthForm::default();
        self.screen = Screen::Dashboard;
        self.set_status(match intent {
            AuthIntent::Login => format!("Welcome back, {username}"),
            AuthIntent::Signup => format!("Account created - welcome, {username}"),
        });
    }

    // ------------------------------------------------------------------
    // Auth screens
    // ------------------------------------------------------------------

    pub fn switch_auth_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Login => Screen::Signup,
            Screen::Signup => Screen::Login,
            Screen::Dashboard => return,
        };
        // Keep the username across the switch; drop everything sensitive.
        self.form.password.clear();
        self.form.error = None;
        self.form.focus = None;
    }

    /// Submit the auth form for the current screen.
    pub fn submit_auth(&mut self) {
        if self.form.busy {
            return;
        }

        let intent = match self.screen {
            Screen::Login => AuthIntent::Login,
            Screen::Signup => AuthIntent::Signup,
            Screen::Dashboard => return,
        };

        if self.form.username.trim().is_empty() || self.form.password.is_empty() {
            self.form.error = Some("Username and password are required".to_string());
            return;
        }
        if intent == AuthIntent::Signup && self.form.email.trim().is_empty() {
            self.form.error = Some("Email is required".to_string());
            return;
        }

        self.form.error = None;
        self.form.busy = true;

        let gateway = self.gateway.clone();
        let events = self.events_tx.clone();
        let username = self.form.username.clone();
        let email = self.form.email.clone();
        let password = self.form.password.clone();
        tokio::spawn(async move {
            let result: Result<Credential, AuthError> = async {
                let response = match intent {
                    AuthIntent::Login => gateway.login(&username, &password).await?,
                    AuthIntent::Signup => gateway.signup(&username, &email, &password).await?,
                };
                SessionStore::accept(response)
            }
            .await;
            let _ = events.send(SessionEvent::AuthDone { intent, result });
        });
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.history.close();
        self.screen = Screen::Login;
        self.form = AuthForm::default();
        self.set_status("Logged out");
    }

    // ------------------------------------------------------------------
    // Dashboard actions
    // ------------------------------------------------------------------

    pub fn start_analysis(&mut self) {
        let token = self.session.token().cloned();
        if self
            .controller
            .analyze(&self.gateway, token, &self.events_tx)
        {
            self.status = None;
        } else {
            self.set_status("Analysis already running");
        }
    }

    /// Route pasted text to whatever owns text input on the current screen.
    pub fn paste(&mut self, text: &str) {
        match self.screen {
            Screen::Dashboard => {
                if !self.history.is_open() {
                    for ch in text.chars() {
                        self.controller.insert_char(ch);
                    }
                }
            }
            Screen::Login | Screen::Signup => {
                for ch in text.chars().filter(|ch| !ch.is_control()) {
                    self.form.push_char(ch);
                }
            }
        }
    }

    pub fn load_sample(&mut self) {
        self.controller.load_sample();
        self.set_status("Sample loaded");
    }

    pub fn open_history(&mut self) {
        let token = self.session.token().cloned();
        self.history.open(&self.gateway, token, &self.events_tx);
    }

    pub fn close_history(&mut self) {
        self.history.close();
    }

    /// Consume the highlighted history record into the analysis display.
    pub fn confirm_history_selection(&mut self) {
        if let Some(record) = self.history.select() {
            self.controller.restore_from_history(&record);
            self.set_status(format!("Restored analysis from {}", record.created_label()));
        }
    }
}
