//! The session gate: the single owner of "is a user signed in".
//!
//! The gate starts `Unknown`, resolves exactly once from the token store at
//! boot, and from then on only moves through [`SessionGate::mark_logged_in`]
//! and [`SessionGate::mark_logged_out`]. Navigation reads [`SessionGate::state`]
//! and nothing else.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{StorageError, StoredTokens, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Boot-time state, before the token store has been read
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl SessionState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has not been restored yet")]
    NotResolved,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SessionGate<S> {
    store: S,
    state: SessionState,
}

impl<S: TokenStore> SessionGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Unknown,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the boot state from the stored access token.
    ///
    /// Only the first call reads storage; later calls return the current
    /// state. A storage failure leaves the gate `Unknown`.
    pub async fn restore(&mut self) -> Result<SessionState, StorageError> {
        if self.state.is_resolved() {
            return Ok(self.state);
        }

        let token = self.store.access_token().await?;
        self.state = if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        info!(state = ?self.state, "Session restored");
        Ok(self.state)
    }

    /// Persist the tokens, then flip to `Authenticated`.
    ///
    /// If either write fails the state is left untouched.
    pub async fn mark_logged_in(&mut self, tokens: &StoredTokens) -> Result<(), SessionError> {
        if !self.state.is_resolved() {
            return Err(SessionError::NotResolved);
        }

        self.store.save_tokens(tokens).await?;
        self.state = SessionState::Authenticated;
        info!("Session started");
        Ok(())
    }

    /// Remove both tokens, then flip to `Unauthenticated`.
    ///
    /// Removal is best-effort: failures are logged and the transition happens
    /// anyway.
    pub async fn mark_logged_out(&mut self) -> Result<(), SessionError> {
        if !self.state.is_resolved() {
            return Err(SessionError::NotResolved);
        }

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "Failed to remove stored token");
            } else {
                debug!(key, "Stored token removed");
            }
        }

        self.state = SessionState::Unauthenticated;
        info!("Session ended");
        Ok(())
    }
}
