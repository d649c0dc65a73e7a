//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_field_char, App, AppState, AuthField, AuthMode, Pane, MAX_FIELD_LENGTH,
    MAX_PASSWORD_LENGTH, MAX_QUESTION_LENGTH,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle auth modal overlay
    if matches!(app.state, AppState::AuthModal) {
        handle_auth_input(app, key);
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Pane switching works everywhere
    match key.code {
        KeyCode::Tab => {
            app.pane = app.pane.next();
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.pane = app.pane.prev();
            return Ok(false);
        }
        _ => {}
    }

    // The question pane is a text editor while authenticated; everything
    // else gets the single-key shortcuts
    if app.pane == Pane::Question && app.is_authenticated() {
        handle_question_input(app, key);
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('l') if !app.is_authenticated() => {
            app.open_auth(AuthMode::Login);
        }
        KeyCode::Char('r') if !app.is_authenticated() => {
            app.open_auth(AuthMode::Register);
        }
        KeyCode::Char('o') if app.is_authenticated() => {
            app.logout();
        }
        KeyCode::Up | KeyCode::Char('k') => match app.pane {
            Pane::History => app.move_history_selection(-1),
            Pane::Answer => app.answer_scroll = app.answer_scroll.saturating_sub(1),
            Pane::Question => {}
        },
        KeyCode::Down | KeyCode::Char('j') => match app.pane {
            Pane::History => app.move_history_selection(1),
            Pane::Answer => app.answer_scroll = app.answer_scroll.saturating_add(1),
            Pane::Question => {}
        },
        KeyCode::Enter if app.pane == Pane::History => {
            app.recall_selected_history();
        }
        _ => {}
    }

    Ok(false)
}

/// Handle keys while editing the question
fn handle_question_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_question(),
        KeyCode::Backspace => {
            app.question_input.pop();
        }
        KeyCode::Esc => {
            app.pane = Pane::History;
        }
        KeyCode::Char(c) => {
            if can_add_field_char(app.question_input.chars().count(), c, MAX_QUESTION_LENGTH) {
                app.question_input.push(c);
            }
        }
        _ => {}
    }
}

/// Handle keys while the auth modal is open
fn handle_auth_input(app: &mut App, key: KeyEvent) {
    // While a submission is in flight only teardown is allowed; the stale
    // result is discarded when it lands
    if app.auth_in_flight {
        if key.code == KeyCode::Esc {
            app.close_auth();
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_auth(),
        KeyCode::Tab | KeyCode::Down => {
            app.auth_focus = app.auth_focus.next(app.auth_mode);
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.auth_focus = app.auth_focus.prev(app.auth_mode);
        }
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Backspace => {
            if let Some(field) = focused_field(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            let max_len = if app.auth_focus == AuthField::Password {
                MAX_PASSWORD_LENGTH
            } else {
                MAX_FIELD_LENGTH
            };
            if let Some(field) = focused_field(app) {
                if can_add_field_char(field.chars().count(), c, max_len) {
                    field.push(c);
                }
            }
        }
        _ => {}
    }
}

fn focused_field(app: &mut App) -> Option<&mut String> {
    match app.auth_focus {
        AuthField::FullName => Some(&mut app.auth_full_name),
        AuthField::Email => Some(&mut app.auth_email),
        AuthField::Username => Some(&mut app.auth_username),
        AuthField::Password => Some(&mut app.auth_password),
        AuthField::Submit => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};
    use uliza_core::{Config, CredentialStore};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &tempfile::TempDir) -> App {
        App::new(Config::default(), CredentialStore::new(dir.path().to_path_buf()))
            .expect("app should build")
    }

    #[tokio::test]
    async fn test_typing_into_auth_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.open_auth(AuthMode::Login);
        app.auth_focus = AuthField::Username;

        for c in "alice".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).expect("input");
        }
        handle_input(&mut app, key(KeyCode::Tab)).expect("input");
        for c in "hunter22".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).expect("input");
        }

        assert_eq!(app.auth_username, "alice");
        assert_eq!(app.auth_password, "hunter22");
        assert_eq!(app.auth_focus, AuthField::Password);
    }

    #[tokio::test]
    async fn test_invalid_auth_submit_shows_error_inline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.open_auth(AuthMode::Login);
        app.auth_username = "alice".to_string();
        app.auth_password = "tiny".to_string();

        handle_input(&mut app, key(KeyCode::Enter)).expect("input");

        assert!(!app.auth_in_flight);
        assert!(app
            .auth_error
            .as_deref()
            .is_some_and(|m| m.contains("at least")));
    }

    #[tokio::test]
    async fn test_escape_closes_modal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.open_auth(AuthMode::Register);

        handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_question_pane_editing_when_authenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.session.establish("tok", "alice").expect("establish");
        app.pane = Pane::Question;

        for c in "hi?".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).expect("input");
        }
        assert_eq!(app.question_input, "hi?");

        handle_input(&mut app, key(KeyCode::Backspace)).expect("input");
        assert_eq!(app.question_input, "hi");
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.pane = Pane::History;

        let quit = handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        assert!(!quit);
        assert_eq!(app.state, AppState::ConfirmingQuit);

        let quit = handle_input(&mut app, key(KeyCode::Char('y'))).expect("input");
        assert!(quit);
    }

    #[tokio::test]
    async fn test_history_navigation_and_recall() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.ledger.append("q1".to_string(), "a1".to_string());
        app.ledger.append("q2".to_string(), "a2".to_string());
        app.pane = Pane::History;
        app.history_selection = 1;

        handle_input(&mut app, key(KeyCode::Up)).expect("input");
        assert_eq!(app.history_selection, 0);

        handle_input(&mut app, key(KeyCode::Enter)).expect("input");
        assert_eq!(app.answer.as_deref(), Some("a1"));
    }
}
