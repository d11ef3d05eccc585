use thiserror::Error;
use tracing::warn;

use super::outcome::{AuthOutcome, Rejection};

/// Transport-level failures of the Auth Client, before they are folded into
/// an [`AuthOutcome`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request could not be sent: {0}")]
    Request(reqwest::Error),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        // Builder errors (bad URL, unserializable body) happen before anything is sent.
        if e.is_builder() {
            ApiError::Request(e)
        } else {
            ApiError::Network(e)
        }
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }
    }
}

impl<T> From<ApiError> for AuthOutcome<T> {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Request(e) => AuthOutcome::Failed {
                reason: e.to_string(),
            },
            ApiError::Network(e) => {
                warn!(error = %e, "Auth request got no response");
                AuthOutcome::NetworkFailure {
                    reason: e.to_string(),
                }
            }
            ApiError::Status { status, body } => {
                warn!(status, body = %ApiError::truncate_body(&body), "Auth request rejected");
                AuthOutcome::Rejected(Rejection::from_body(status, &body))
            }
            ApiError::RateLimited => AuthOutcome::Rejected(Rejection {
                status: Some(429),
                message: Some("Too many attempts. Please wait a moment and try again.".to_string()),
                ..Default::default()
            }),
            ApiError::InvalidResponse(reason) => AuthOutcome::Failed { reason },
        }
    }
}
