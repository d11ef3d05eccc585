//! HTTP client for the Green Lens `/api/Auth` endpoints.
//!
//! Each operation validates its input first, then performs a single JSON POST
//! and folds the response (or the lack of one) into an [`AuthOutcome`].

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::storage::StoredTokens;
use crate::validation::{validate_login, validate_registration, validate_reset};

use super::outcome::{AuthOutcome, LoginSuccess, Rejection, EMAIL_NOT_CONFIRMED_MESSAGE};
use super::types::{
    ApiEnvelope, ForgotPasswordPayload, LoginData, LoginPayload, RegisterPayload, Role,
};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/Auth/login";
const REGISTER_PATH: &str = "/api/Auth/register";
const FORGOT_PASSWORD_PATH: &str = "/api/Auth/forgot-password";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Registration form contents. `confirm_password` is checked locally and
/// never sent.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// Auth API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    initial_backoff: Duration,
}

impl AuthClient {
    /// Create a client for the API at `base_url` (scheme, host and port).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the first rate-limit backoff delay (doubles on each retry).
    pub fn with_retry_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and decode the success envelope, retrying on 429.
    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(url = %url, "Sending auth request");
            let response = self.client.post(&url).json(body).send().await?;
            let status = response.status();

            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }

            let text = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::from_status(status, &text));
            }

            return serde_json::from_str(&text).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
            });
        }
    }

    /// Log in with an email (or username) and password.
    ///
    /// A `succeeded: true` reply whose user has `isEmailConfirmed: false` is
    /// reported as a rejection and yields no tokens.
    pub async fn login(&self, identifier: &str, password: &str) -> AuthOutcome<LoginSuccess> {
        if let Err(e) = validate_login(identifier, password) {
            return AuthOutcome::Invalid(e);
        }

        let payload = LoginPayload {
            email: identifier.trim(),
            password: password.trim(),
        };

        let envelope: ApiEnvelope<LoginData> = match self.post(LOGIN_PATH, &payload).await {
            Ok(envelope) => envelope,
            Err(e) => return e.into(),
        };

        if !envelope.succeeded {
            info!("Login rejected by server");
            return AuthOutcome::Rejected(Rejection::from_envelope(None, envelope));
        }

        let Some(data) = envelope.data else {
            return AuthOutcome::Failed {
                reason: "Login response did not include session data".to_string(),
            };
        };

        if data.user.is_email_confirmed == Some(false) {
            info!(user = %data.user.username, "Login refused: email not confirmed");
            return AuthOutcome::Rejected(Rejection::with_message(EMAIL_NOT_CONFIRMED_MESSAGE));
        }

        let access_token = data.access_token.unwrap_or_default();
        let refresh_token = data.refresh_token.unwrap_or_default();
        if access_token.is_empty() || refresh_token.is_empty() {
            return AuthOutcome::Failed {
                reason: "Login response did not include tokens".to_string(),
            };
        }

        info!(user = %data.user.username, "Login succeeded");
        AuthOutcome::Success(LoginSuccess {
            tokens: StoredTokens {
                access_token,
                refresh_token,
            },
            user: data.user,
        })
    }

    /// Create an account. Success does not sign the user in.
    pub async fn register(&self, request: &RegisterRequest) -> AuthOutcome<String> {
        if let Err(e) = validate_registration(
            &request.email,
            &request.username,
            &request.password,
            &request.confirm_password,
        ) {
            return AuthOutcome::Invalid(e);
        }

        let payload = RegisterPayload {
            email: request.email.trim(),
            username: request.username.trim(),
            password: &request.password,
            role_id: request.role.id(),
        };

        match self.post::<serde_json::Value, _>(REGISTER_PATH, &payload).await {
            Ok(envelope) if envelope.succeeded => {
                info!(role = request.role.id(), "Registration succeeded");
                AuthOutcome::Success(
                    envelope
                        .message
                        .unwrap_or_else(|| "Account created successfully".to_string()),
                )
            }
            Ok(envelope) => AuthOutcome::Rejected(Rejection::from_envelope(None, envelope)),
            Err(e) => e.into(),
        }
    }

    /// Ask the server to email a password reset link.
    pub async fn request_password_reset(&self, email: &str) -> AuthOutcome<String> {
        if let Err(e) = validate_reset(email) {
            return AuthOutcome::Invalid(e);
        }

        let payload = ForgotPasswordPayload {
            email: email.trim(),
        };

        match self
            .post::<serde_json::Value, _>(FORGOT_PASSWORD_PATH, &payload)
            .await
        {
            Ok(envelope) if envelope.succeeded => AuthOutcome::Success(
                envelope.message.unwrap_or_else(|| {
                    "We sent a password reset email. Please check your inbox.".to_string()
                }),
            ),
            Ok(envelope) => AuthOutcome::Rejected(Rejection::from_envelope(None, envelope)),
            Err(e) => e.into(),
        }
    }
}
