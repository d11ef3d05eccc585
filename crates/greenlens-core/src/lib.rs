//! Core library for the Green Lens client.
//!
//! - `api`: the auth HTTP client and its outcome types
//! - `storage`: token persistence backends
//! - `session`: the session gate state machine
//! - `navigation`: which screens are reachable for a session state
//! - `validation`: client-side form checks
//! - `config`: user configuration and env overrides

pub mod api;
pub mod catalog;
pub mod config;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod utils;
pub mod validation;

pub use api::{AuthClient, AuthOutcome, LoginSuccess, RegisterRequest, Rejection, RejectionDisplay, Role};
pub use config::Config;
pub use navigation::{Navigator, Screen};
pub use session::{SessionError, SessionGate, SessionState};
pub use storage::{StoredTokens, TokenBackend, TokenStore};
pub use validation::{Field, ValidationError};
