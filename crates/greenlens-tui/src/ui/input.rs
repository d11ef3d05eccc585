//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Each screen has its own handler.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use greenlens_core::navigation::Screen;

use crate::app::{App, AppState, HomeTab};
use crate::forms::{ForgotFocus, LoginFocus, RegisterFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
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

    // Nothing to do until the session is resolved
    let Some(screen) = app.current_screen() else {
        return Ok(false);
    };

    match screen {
        Screen::Login => handle_login_input(app, key),
        Screen::Register => handle_register_input(app, key),
        Screen::ForgotPassword => handle_forgot_input(app, key),
        Screen::Home => handle_home_input(app, key).await,
    }
    Ok(false)
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Tab | KeyCode::Down => app.login.next_focus(),
        KeyCode::BackTab | KeyCode::Up => app.login.prev_focus(),
        KeyCode::Enter => match app.login.focus {
            LoginFocus::Email => app.login.next_focus(),
            LoginFocus::Password | LoginFocus::Submit => app.submit_login(),
            LoginFocus::RegisterLink => app.open(Screen::Register),
            LoginFocus::ForgotLink => app.open(Screen::ForgotPassword),
        },
        KeyCode::Backspace => app.login.pop_char(),
        KeyCode::Char(c) => app.login.push_char(c),
        _ => {}
    }
}

fn handle_register_input(app: &mut App, key: KeyEvent) {
    let on_role = app.register.focus == RegisterFocus::Role;
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Tab | KeyCode::Down => app.register.next_focus(),
        KeyCode::BackTab | KeyCode::Up => app.register.prev_focus(),
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if on_role => {
            app.register.toggle_role()
        }
        KeyCode::Enter => match app.register.focus {
            RegisterFocus::Role => app.register.toggle_role(),
            RegisterFocus::ConfirmPassword | RegisterFocus::Submit => app.submit_register(),
            RegisterFocus::BackLink => app.go_back(),
            _ => app.register.next_focus(),
        },
        KeyCode::Backspace => app.register.pop_char(),
        KeyCode::Char(c) => app.register.push_char(c),
        _ => {}
    }
}

fn handle_forgot_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Tab | KeyCode::Down => app.forgot.next_focus(),
        KeyCode::BackTab | KeyCode::Up => app.forgot.prev_focus(),
        KeyCode::Enter => match app.forgot.focus {
            ForgotFocus::Email | ForgotFocus::Submit => app.submit_reset(),
            ForgotFocus::BackLink => app.go_back(),
        },
        KeyCode::Backspace => app.forgot.pop_char(),
        KeyCode::Char(c) => app.forgot.push_char(c),
        _ => {}
    }
}

async fn handle_home_input(app: &mut App, key: KeyEvent) {
    if app.home.searching {
        handle_search_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('/') => {
            app.home.searching = true;
            app.status_message = None;
        }
        KeyCode::Char('l') => app.logout().await,
        KeyCode::Char('1') => app.home.tab = HomeTab::All,
        KeyCode::Char('2') => app.home.tab = HomeTab::Shopping,
        KeyCode::Char('3') => app.home.tab = HomeTab::Chat,
        KeyCode::Left => app.home.tab = app.home.tab.prev(),
        KeyCode::Right => app.home.tab = app.home.tab.next(),
        KeyCode::Up | KeyCode::Char('k') => app.home.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.home.select_next(),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let home = &mut app.home;
    match key.code {
        KeyCode::Esc => {
            home.searching = false;
            home.search_query.clear();
        }
        KeyCode::Enter => home.searching = false,
        KeyCode::Backspace => {
            home.search_query.pop();
        }
        KeyCode::Char(c) if !c.is_control() => home.search_query.push(c),
        _ => {}
    }
    home.clamp_selection();
}
