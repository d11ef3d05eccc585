//! Which screens can be shown for a given session state.
//!
//! Signed-out users see Login, Register and ForgotPassword; signed-in users
//! see Home. The two sets never overlap, and nothing is reachable while the
//! session is still `Unknown`.

use thiserror::Error;

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    ForgotPassword,
    Home,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Sign in",
            Screen::Register => "Create account",
            Screen::ForgotPassword => "Forgot password",
            Screen::Home => "Home",
        }
    }
}

const ANONYMOUS_SCREENS: &[Screen] = &[Screen::Login, Screen::Register, Screen::ForgotPassword];
const AUTHENTICATED_SCREENS: &[Screen] = &[Screen::Home];

/// Screens reachable in `state`.
pub fn reachable_screens(state: SessionState) -> &'static [Screen] {
    match state {
        SessionState::Unknown => &[],
        SessionState::Unauthenticated => ANONYMOUS_SCREENS,
        SessionState::Authenticated => AUTHENTICATED_SCREENS,
    }
}

/// The screen a state opens on.
pub fn entry_screen(state: SessionState) -> Option<Screen> {
    match state {
        SessionState::Unknown => None,
        SessionState::Unauthenticated => Some(Screen::Login),
        SessionState::Authenticated => Some(Screen::Home),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("{0:?} is not reachable while the session is {1:?}")]
    Unreachable(Screen, SessionState),

    #[error("{to:?} can only be opened from {from:?}")]
    WrongOrigin { from: Screen, to: Screen },
}

/// Stack of open screens, always rooted at the state's entry screen.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Navigator {
    pub fn new(state: SessionState) -> Self {
        Self {
            stack: entry_screen(state).into_iter().collect(),
        }
    }

    /// The screen on top, `None` while loading.
    pub fn current(&self) -> Option<Screen> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Re-root the stack if the current screen is not reachable in `state`.
    /// Returns true when the stack was reset.
    pub fn sync(&mut self, state: SessionState) -> bool {
        let reachable = reachable_screens(state);
        let valid = if self.stack.is_empty() {
            reachable.is_empty()
        } else {
            self.stack.iter().all(|s| reachable.contains(s))
        };
        if valid {
            return false;
        }
        self.stack = entry_screen(state).into_iter().collect();
        true
    }

    /// Open `to` on top of the current screen.
    ///
    /// Register and ForgotPassword open only from Login. Navigating to Login
    /// from one of them is the same as going back.
    pub fn navigate(&mut self, state: SessionState, to: Screen) -> Result<(), NavigationError> {
        if !reachable_screens(state).contains(&to) {
            return Err(NavigationError::Unreachable(to, state));
        }
        self.sync(state);

        let from = self.current().ok_or(NavigationError::Unreachable(to, state))?;
        if from == to {
            return Ok(());
        }

        match to {
            Screen::Register | Screen::ForgotPassword => {
                if from != Screen::Login {
                    return Err(NavigationError::WrongOrigin { from, to });
                }
                self.stack.push(to);
            }
            Screen::Login | Screen::Home => {
                self.stack.truncate(1);
            }
        }
        Ok(())
    }

    /// Close the top screen. Entry screens stay put.
    pub fn back(&mut self) -> Option<Screen> {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.current()
    }
}
