//! Application state management for the Uliza TUI.
//!
//! This module contains the core `App` struct that composes the session
//! manager, auth flow, query submitter, and history ledger into one
//! coordinator. Network flows run as spawned tasks and report back through
//! an MPSC channel; all state mutation happens on the main loop, so the
//! session manager keeps a single writer.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use uliza_core::{
    ApiClient, AuthError, AuthFlow, AuthRequest, Config, CredentialStore, Ledger, QueryError,
    QuerySubmitter, SessionManager,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the flow result channel.
/// One auth and one query flow can be in flight at a time; 8 is headroom.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for username/email/full name input.
pub const MAX_FIELD_LENGTH: usize = 80;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the question input.
pub const MAX_QUESTION_LENGTH: usize = 2000;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    AuthModal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Which pane has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    History,
    Question,
    Answer,
}

impl Pane {
    pub fn next(&self) -> Self {
        match self {
            Pane::History => Pane::Question,
            Pane::Question => Pane::Answer,
            Pane::Answer => Pane::History,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Pane::History => Pane::Answer,
            Pane::Question => Pane::History,
            Pane::Answer => Pane::Question,
        }
    }
}

/// Auth modal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }
}

/// Auth modal field focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    FullName,
    Email,
    Username,
    Password,
    Submit,
}

impl AuthField {
    /// Cycle forward; the registration-only fields are skipped in login mode.
    pub fn next(&self, mode: AuthMode) -> Self {
        match (mode, self) {
            (AuthMode::Register, AuthField::FullName) => AuthField::Email,
            (AuthMode::Register, AuthField::Email) => AuthField::Username,
            (_, AuthField::Username) => AuthField::Password,
            (_, AuthField::Password) => AuthField::Submit,
            (AuthMode::Login, AuthField::Submit) => AuthField::Username,
            (AuthMode::Register, AuthField::Submit) => AuthField::FullName,
            // Registration-only fields while in login mode
            (AuthMode::Login, _) => AuthField::Username,
        }
    }

    pub fn prev(&self, mode: AuthMode) -> Self {
        match (mode, self) {
            (AuthMode::Register, AuthField::FullName) => AuthField::Submit,
            (AuthMode::Register, AuthField::Email) => AuthField::FullName,
            (AuthMode::Register, AuthField::Username) => AuthField::Email,
            (AuthMode::Login, AuthField::Username) => AuthField::Submit,
            (_, AuthField::Password) => AuthField::Username,
            (_, AuthField::Submit) => AuthField::Password,
            (AuthMode::Login, _) => AuthField::Username,
        }
    }

    pub fn first(mode: AuthMode) -> Self {
        match mode {
            AuthMode::Login => AuthField::Username,
            AuthMode::Register => AuthField::FullName,
        }
    }
}

// ============================================================================
// Background Flow Results
// ============================================================================

/// Results sent from spawned flow tasks back to the main loop.
///
/// Each result carries the epoch of the flow instance that started it;
/// results from a torn-down instance are discarded on arrival.
enum FlowResult {
    Auth {
        epoch: u64,
        username: String,
        outcome: Result<String, AuthError>,
    },
    Answer {
        epoch: u64,
        question: String,
        outcome: Result<String, QueryError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionManager,
    pub api: ApiClient,
    pub ledger: Ledger,
    auth_flow: Arc<AuthFlow>,
    submitter: Arc<QuerySubmitter>,

    // UI state
    pub state: AppState,
    pub pane: Pane,
    pub question_input: String,
    pub answer: Option<String>,
    pub answer_scroll: u16,
    pub history_selection: usize,
    pub status_message: Option<String>,
    pub ask_in_flight: bool,

    // Auth modal state
    pub auth_mode: AuthMode,
    pub auth_focus: AuthField,
    pub auth_username: String,
    pub auth_password: String,
    pub auth_email: String,
    pub auth_full_name: String,
    pub auth_error: Option<String>,
    pub auth_in_flight: bool,

    // Flow instance epochs; bumped on teardown so stale results are dropped
    auth_epoch: u64,
    ask_epoch: u64,

    // Background flow channel
    result_rx: mpsc::Receiver<FlowResult>,
    result_tx: mpsc::Sender<FlowResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, store: CredentialStore) -> Result<Self> {
        let api = ApiClient::new(config.api_url())?;
        debug!(base_url = %api.base_url(), "API client configured");

        let session = SessionManager::new(store);
        let auth_username = config.last_username.clone().unwrap_or_default();

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            session,
            api,
            ledger: Ledger::new(),
            auth_flow: Arc::new(AuthFlow::new()),
            submitter: Arc::new(QuerySubmitter::new()),

            state: AppState::Normal,
            pane: Pane::Question,
            question_input: String::new(),
            answer: None,
            answer_scroll: 0,
            history_selection: 0,
            status_message: None,
            ask_in_flight: false,

            auth_mode: AuthMode::Login,
            auth_focus: AuthField::Username,
            auth_username,
            auth_password: String::new(),
            auth_email: String::new(),
            auth_full_name: String::new(),
            auth_error: None,
            auth_in_flight: false,

            auth_epoch: 0,
            ask_epoch: 0,

            result_rx: rx,
            result_tx: tx,
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Validate any stored credential at startup. Anonymous afterwards means
    /// the login modal opens.
    pub async fn restore_session(&mut self) {
        self.session.restore(&self.api).await;
        if !self.session.is_authenticated() {
            self.open_auth(AuthMode::Login);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// End the session on user request and clear everything derived from it.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.end() {
            warn!(error = %e, "Failed to clear credential on logout");
        }
        self.clear_session_view();
        self.status_message = Some("Logged out".to_string());
    }

    /// Explicit reset after the service rejected the active token: the
    /// session ends, dependent state re-derives from anonymous, and the
    /// login modal reopens.
    fn reset_expired_session(&mut self) {
        if let Err(e) = self.session.end() {
            warn!(error = %e, "Failed to clear credential after session expiry");
        }
        self.clear_session_view();
        self.open_auth(AuthMode::Login);
    }

    /// Drop all view state scoped to the session that just ended.
    fn clear_session_view(&mut self) {
        self.ledger.clear();
        self.answer = None;
        self.answer_scroll = 0;
        self.question_input.clear();
        self.history_selection = 0;
        self.ask_epoch += 1;
        self.ask_in_flight = false;
    }

    // =========================================================================
    // Auth Modal
    // =========================================================================

    /// Open the auth modal in the given mode. A new flow instance begins:
    /// anything still in flight from a previous one is stale.
    pub fn open_auth(&mut self, mode: AuthMode) {
        self.state = AppState::AuthModal;
        self.auth_mode = mode;
        self.auth_error = None;
        self.auth_in_flight = false;
        self.auth_epoch += 1;
        self.auth_focus = if mode == AuthMode::Login && !self.auth_username.is_empty() {
            AuthField::Password
        } else {
            AuthField::first(mode)
        };
    }

    /// Close the modal. An in-flight submission keeps running but its result
    /// is discarded on arrival.
    pub fn close_auth(&mut self) {
        self.state = AppState::Normal;
        self.auth_epoch += 1;
        self.auth_in_flight = false;
        self.auth_error = None;
        self.auth_password.clear();
    }

    /// Submit the auth form. Repeat submissions while one is in flight are
    /// suppressed.
    pub fn submit_auth(&mut self) {
        if self.auth_in_flight {
            return;
        }

        let request = match self.auth_mode {
            AuthMode::Login => AuthRequest::Login {
                username: self.auth_username.trim().to_string(),
                password: self.auth_password.clone(),
            },
            AuthMode::Register => AuthRequest::Register {
                username: self.auth_username.trim().to_string(),
                password: self.auth_password.clone(),
                email: self.auth_email.trim().to_string(),
                full_name: self.auth_full_name.trim().to_string(),
            },
        };

        // Reject invalid forms before anything leaves the machine
        if let Err(e) = request.validate() {
            self.auth_error = Some(e.to_string());
            return;
        }

        self.auth_error = None;
        self.auth_in_flight = true;

        let flow = Arc::clone(&self.auth_flow);
        let api = self.api.clone();
        let tx = self.result_tx.clone();
        let epoch = self.auth_epoch;
        let username = request.username().to_string();

        tokio::spawn(async move {
            let outcome = flow.submit(&api, &request).await;
            if tx
                .send(FlowResult::Auth {
                    epoch,
                    username,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!("Auth result dropped - channel closed");
            }
        });
    }

    // =========================================================================
    // Questions
    // =========================================================================

    /// Submit the question form. Repeat submissions while one is in flight
    /// are suppressed at the call site.
    pub fn submit_question(&mut self) {
        if self.ask_in_flight {
            return;
        }

        let question = self.question_input.trim().to_string();
        if question.is_empty() {
            self.status_message = Some(QueryError::EmptyQuestion.to_string());
            return;
        }

        let Some(token) = self.session.token().map(str::to_owned) else {
            self.status_message = Some(QueryError::Unauthenticated.to_string());
            return;
        };

        self.status_message = None;
        self.ask_in_flight = true;

        let submitter = Arc::clone(&self.submitter);
        let api = self.api.clone();
        let tx = self.result_tx.clone();
        let epoch = self.ask_epoch;

        tokio::spawn(async move {
            let outcome = submitter.submit(&api, Some(&token), &question).await;
            if tx
                .send(FlowResult::Answer {
                    epoch,
                    question,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!("Answer result dropped - channel closed");
            }
        });
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn move_history_selection(&mut self, delta: i64) {
        if self.ledger.is_empty() {
            return;
        }
        let last = self.ledger.len() as i64 - 1;
        let next = (self.history_selection as i64 + delta).clamp(0, last);
        self.history_selection = next as usize;
    }

    /// Re-display the stored answer for the selected history entry.
    /// No network call: the answer comes straight from the ledger.
    pub fn recall_selected_history(&mut self) {
        let Some(question) = self
            .ledger
            .records()
            .get(self.history_selection)
            .map(|r| r.question.clone())
        else {
            return;
        };

        if let Some(record) = self.ledger.find_by_question(&question) {
            self.answer = Some(record.answer.clone());
            self.answer_scroll = 0;
        }
    }

    // =========================================================================
    // Background Flow Results
    // =========================================================================

    /// Drain completed flow results and apply them
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_flow_result(result);
        }
    }

    fn process_flow_result(&mut self, result: FlowResult) {
        match result {
            FlowResult::Auth {
                epoch,
                username,
                outcome,
            } => {
                if epoch != self.auth_epoch {
                    debug!("Discarding stale auth result");
                    return;
                }
                self.auth_in_flight = false;

                match outcome {
                    Ok(token) => {
                        if let Err(e) = self.session.establish(&token, &username) {
                            warn!(error = %e, "Failed to establish session");
                            self.auth_error = Some(format!("Failed to save session: {}", e));
                            return;
                        }

                        self.config.last_username = Some(username.clone());
                        if let Err(e) = self.config.save() {
                            warn!(error = %e, "Failed to save config");
                        }

                        self.auth_password.clear();
                        self.auth_email.clear();
                        self.auth_full_name.clear();
                        self.auth_error = None;
                        self.state = AppState::Normal;
                        self.pane = Pane::Question;
                        self.status_message = Some(format!("Signed in as {}", username));
                        info!(username = %username, "Authentication complete");
                    }
                    Err(e) => {
                        debug!(error = %e, "Authentication failed");
                        self.auth_error = Some(e.to_string());
                    }
                }
            }
            FlowResult::Answer {
                epoch,
                question,
                outcome,
            } => {
                if epoch != self.ask_epoch {
                    debug!("Discarding stale answer result");
                    return;
                }
                self.ask_in_flight = false;

                match outcome {
                    Ok(answer) => {
                        self.ledger.append(question, answer.clone());
                        self.answer = Some(answer);
                        self.answer_scroll = 0;
                        self.question_input.clear();
                        self.history_selection = self.ledger.len() - 1;
                        self.status_message = None;
                    }
                    Err(e @ QueryError::SessionExpired) => {
                        info!("Token rejected mid-use; resetting session");
                        self.status_message = Some(e.to_string());
                        self.reset_expired_session();
                    }
                    Err(e) => {
                        debug!(error = %e, "Question failed");
                        self.status_message = Some(e.to_string());
                    }
                }
            }
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be appended to a bounded input field
pub fn can_add_field_char(current_len: usize, c: char, max_len: usize) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
