//! Application state management for the Green Lens TUI.
//!
//! `App` owns the session gate, the navigator and the per-screen form state.
//! Network calls run on spawned tasks and report back over an MPSC channel
//! that the main loop drains every tick.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use greenlens_core::api::{AuthOutcome, LoginSuccess, UserProfile};
use greenlens_core::catalog::{self, Plant};
use greenlens_core::navigation::{Navigator, Screen};
use greenlens_core::storage::{Backend, TokenBackend};
use greenlens_core::validation::{validate_login, validate_registration, validate_reset};
use greenlens_core::{AuthClient, Config, SessionGate, SessionState};

use crate::forms::{ForgotPasswordForm, FormErrors, LoginForm, RegisterForm};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Only one request is in flight at a time, so a handful is plenty.
const CHANNEL_BUFFER_SIZE: usize = 8;

const REGISTER_SUCCESS_FALLBACK: &str = "Account created. Check your email to confirm it.";
const RESET_SUCCESS_FALLBACK: &str = "If that email is registered, a reset link is on its way.";

// ============================================================================
// UI State
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Decorative tabs on the Home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeTab {
    #[default]
    All,
    Shopping,
    Chat,
}

impl HomeTab {
    pub const ALL: [HomeTab; 3] = [HomeTab::All, HomeTab::Shopping, HomeTab::Chat];

    pub fn title(&self) -> &'static str {
        match self {
            HomeTab::All => "ALL",
            HomeTab::Shopping => "SHOPPING",
            HomeTab::Chat => "CHAT",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            HomeTab::All => HomeTab::Shopping,
            HomeTab::Shopping => HomeTab::Chat,
            HomeTab::Chat => HomeTab::All,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            HomeTab::All => HomeTab::Chat,
            HomeTab::Shopping => HomeTab::All,
            HomeTab::Chat => HomeTab::Shopping,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub tab: HomeTab,
    pub search_query: String,
    pub searching: bool,
    pub selection: usize,
}

impl HomeState {
    pub fn visible_plants(&self) -> Vec<&'static Plant> {
        catalog::search(self.search_query.trim())
    }

    pub fn select_next(&mut self) {
        let count = self.visible_plants().len();
        if count > 0 {
            self.selection = (self.selection + 1).min(count - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    /// Keep the selection inside the filtered list.
    pub fn clamp_selection(&mut self) {
        let count = self.visible_plants().len();
        self.selection = self.selection.min(count.saturating_sub(1));
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned auth requests.
enum AuthResult {
    Login {
        email: String,
        outcome: AuthOutcome<LoginSuccess>,
    },
    Register(AuthOutcome<String>),
    PasswordReset(AuthOutcome<String>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub gate: SessionGate<TokenBackend>,
    pub navigator: Navigator,
    pub client: AuthClient,

    // UI State
    pub state: AppState,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub forgot: ForgotPasswordForm,
    pub home: HomeState,

    /// Screen whose request is in flight
    pub pending: Option<Screen>,
    /// Success message shown on the Login screen
    pub notice: Option<String>,
    pub status_message: Option<String>,
    pub user: Option<UserProfile>,
    pub signed_in_at: Option<DateTime<Local>>,
    pub tick: u64,

    /// Memory-only session: nothing is written to the config file
    ephemeral: bool,

    result_rx: mpsc::Receiver<AuthResult>,
    result_tx: mpsc::Sender<AuthResult>,
}

impl App {
    pub fn new(config: Config, store: TokenBackend, client: AuthClient) -> Self {
        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let ephemeral = store.kind() == Backend::Memory;
        let login = LoginForm::new(config.last_email.clone());

        debug!(base_url = client.base_url(), backend = ?store.kind(), "App created");

        Self {
            config,
            gate: SessionGate::new(store),
            navigator: Navigator::new(SessionState::Unknown),
            client,

            state: AppState::Normal,
            login,
            register: RegisterForm::default(),
            forgot: ForgotPasswordForm::default(),
            home: HomeState::default(),

            pending: None,
            notice: None,
            status_message: None,
            user: None,
            signed_in_at: None,
            tick: 0,

            ephemeral,

            result_rx,
            result_tx,
        }
    }

    /// Resolve the session from storage and open the matching entry screen.
    pub async fn boot(&mut self) -> Result<()> {
        let state = self
            .gate
            .restore()
            .await
            .context("Failed to read the stored session")?;
        self.navigator.sync(state);
        info!(?state, screen = ?self.navigator.current(), "Boot complete");
        Ok(())
    }

    pub fn current_screen(&self) -> Option<Screen> {
        self.navigator.current()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Open Register or ForgotPassword from Login.
    pub fn open(&mut self, screen: Screen) {
        if self.is_pending() {
            return;
        }
        match self.navigator.navigate(self.gate.state(), screen) {
            Ok(()) => {
                self.notice = None;
                self.login.password.clear();
                self.login.errors = FormErrors::default();
            }
            Err(e) => warn!(error = %e, "Navigation refused"),
        }
    }

    /// Leave the current sub-screen, discarding its form.
    pub fn go_back(&mut self) {
        if self.is_pending() {
            return;
        }
        match self.navigator.current() {
            Some(Screen::Register) => self.register = RegisterForm::default(),
            Some(Screen::ForgotPassword) => self.forgot = ForgotPasswordForm::default(),
            _ => return,
        }
        self.navigator.back();
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    pub fn submit_login(&mut self) {
        if self.is_pending() {
            return;
        }
        self.notice = None;
        if let Err(e) = validate_login(&self.login.email, &self.login.password) {
            debug!(error = %e, "Login blocked by validation");
            self.login.errors = FormErrors::from_validation(&e);
            return;
        }
        self.login.errors = FormErrors::default();
        self.pending = Some(Screen::Login);

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        tokio::spawn(async move {
            let outcome = client.login(&email, &password).await;
            Self::send_result(&tx, AuthResult::Login { email, outcome }).await;
        });
    }

    pub fn submit_register(&mut self) {
        if self.is_pending() {
            return;
        }
        let form = &self.register;
        if let Err(e) = validate_registration(
            &form.email,
            &form.username,
            &form.password,
            &form.confirm_password,
        ) {
            debug!(error = %e, "Registration blocked by validation");
            self.register.errors = FormErrors::from_validation(&e);
            return;
        }
        self.register.errors = FormErrors::default();
        self.pending = Some(Screen::Register);

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let request = self.register.to_request();
        tokio::spawn(async move {
            let outcome = client.register(&request).await;
            Self::send_result(&tx, AuthResult::Register(outcome)).await;
        });
    }

    pub fn submit_reset(&mut self) {
        if self.is_pending() {
            return;
        }
        if let Err(e) = validate_reset(&self.forgot.email) {
            self.forgot.errors = FormErrors::from_validation(&e);
            return;
        }
        self.forgot.errors = FormErrors::default();
        self.pending = Some(Screen::ForgotPassword);

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let email = self.forgot.email.clone();
        tokio::spawn(async move {
            let outcome = client.request_password_reset(&email).await;
            Self::send_result(&tx, AuthResult::PasswordReset(outcome)).await;
        });
    }

    /// Helper to send results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<AuthResult>, result: AuthResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send auth result - channel closed");
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn logout(&mut self) {
        if let Err(e) = self.gate.mark_logged_out().await {
            warn!(error = %e, "Logout refused");
            return;
        }
        self.navigator.sync(self.gate.state());
        self.user = None;
        self.signed_in_at = None;
        self.home = HomeState::default();
        self.login = LoginForm::new(self.config.last_email.clone());
        self.status_message = Some("Signed out".to_string());
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Check for completed background tasks and process results
    pub async fn check_background_tasks(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_result(result).await;
        }
    }

    async fn process_result(&mut self, result: AuthResult) {
        self.pending = None;
        match result {
            AuthResult::Login { email, outcome } => self.finish_login(email, outcome).await,
            AuthResult::Register(outcome) => match outcome {
                AuthOutcome::Success(message) => {
                    info!("Registration accepted");
                    self.register = RegisterForm::default();
                    self.navigator.back();
                    self.notice = Some(non_empty_or(message, REGISTER_SUCCESS_FALLBACK));
                }
                other => {
                    self.register.errors = FormErrors::from_outcome(&other, "Registration failed");
                }
            },
            AuthResult::PasswordReset(outcome) => match outcome {
                AuthOutcome::Success(message) => {
                    info!("Password reset requested");
                    self.forgot = ForgotPasswordForm::default();
                    self.navigator.back();
                    self.notice = Some(non_empty_or(message, RESET_SUCCESS_FALLBACK));
                }
                other => {
                    self.forgot.errors =
                        FormErrors::from_outcome(&other, "Password reset request failed");
                }
            },
        }
    }

    async fn finish_login(&mut self, email: String, outcome: AuthOutcome<LoginSuccess>) {
        let success = match outcome {
            AuthOutcome::Success(success) => success,
            other => {
                self.login.errors = FormErrors::from_outcome(&other, "Login failed");
                return;
            }
        };

        if let Err(e) = self.gate.mark_logged_in(&success.tokens).await {
            error!(error = %e, "Failed to persist session");
            self.login.errors = FormErrors::general(format!("Could not save your session: {}", e));
            return;
        }

        self.navigator.sync(self.gate.state());
        info!(user = success.user.display_name(), "Login successful");

        self.user = Some(success.user);
        self.signed_in_at = Some(Local::now());
        self.status_message = None;
        self.notice = None;

        self.config.last_email = Some(email);
        if !self.ephemeral {
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
        self.login = LoginForm::new(self.config.last_email.clone());
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

// ============================================================================
// Tests
// ============================================================================
