//! REST client module for the Green Lens auth API.
//!
//! This module provides the `AuthClient` for the three unauthenticated
//! endpoints (login, register, forgot-password) and the `AuthOutcome` type
//! every call resolves to.
//!
//! The API wraps every reply in a `{ succeeded, message, data, errors }`
//! envelope; error statuses may carry the same envelope or an ASP.NET
//! problem-details body.

pub mod client;
pub mod error;
pub mod outcome;
pub mod types;

pub use client::{AuthClient, RegisterRequest};
pub use error::ApiError;
pub use outcome::{
    AuthOutcome, LoginSuccess, Rejection, RejectionDisplay, CONNECTIVITY_MESSAGE,
    EMAIL_NOT_CONFIRMED_MESSAGE,
};
pub use types::{Role, UserProfile};
