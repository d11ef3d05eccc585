use std::collections::BTreeMap;

use crate::storage::StoredTokens;
use crate::validation::{Field, ValidationError};

use super::types::{ApiEnvelope, ServerErrors, UserProfile};

/// Generic text shown for any transport failure.
pub const CONNECTIVITY_MESSAGE: &str = "Unable to connect to server. Check your network connection.";

/// Shown when the login succeeds but the account's email is unverified.
pub const EMAIL_NOT_CONFIRMED_MESSAGE: &str =
    "Your email address is not confirmed yet. Check your inbox for the verification link.";

/// Result of one Auth Client call, consumed by the screen that issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T> {
    Success(T),
    /// Blocked before any request was built
    Invalid(ValidationError),
    /// The server answered and said no
    Rejected(Rejection),
    /// The request went out but no response came back
    NetworkFailure { reason: String },
    /// The request never went out, or the reply made no sense
    Failed { reason: String },
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AuthOutcome<U> {
        match self {
            AuthOutcome::Success(value) => AuthOutcome::Success(f(value)),
            AuthOutcome::Invalid(e) => AuthOutcome::Invalid(e),
            AuthOutcome::Rejected(r) => AuthOutcome::Rejected(r),
            AuthOutcome::NetworkFailure { reason } => AuthOutcome::NetworkFailure { reason },
            AuthOutcome::Failed { reason } => AuthOutcome::Failed { reason },
        }
    }

    /// One-line description of a failure, `None` on success.
    pub fn failure_message(&self, fallback: &str) -> Option<String> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Invalid(e) => Some(e.to_string()),
            AuthOutcome::Rejected(r) => Some(r.summary(fallback)),
            AuthOutcome::NetworkFailure { .. } => Some(CONNECTIVITY_MESSAGE.to_string()),
            AuthOutcome::Failed { reason } => Some(reason.clone()),
        }
    }
}

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub tokens: StoredTokens,
    pub user: UserProfile,
}

/// A server-side "no": an error status or `succeeded: false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// How a rejection should be shown on a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionDisplay {
    /// Messages keyed by input; `general` holds entries for unknown keys
    FieldErrors {
        fields: BTreeMap<Field, Vec<String>>,
        general: Vec<String>,
    },
    /// A single message for the top of the form
    Message(String),
}

impl Rejection {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub(crate) fn from_envelope<T>(status: Option<u16>, envelope: ApiEnvelope<T>) -> Self {
        let mut message = envelope.message.filter(|m| !m.trim().is_empty());
        let mut field_errors = BTreeMap::new();

        match envelope.errors {
            Some(ServerErrors::Fields(map)) => {
                field_errors = map.into_iter().filter(|(_, msgs)| !msgs.is_empty()).collect();
            }
            Some(ServerErrors::List(list)) if !list.is_empty() && message.is_none() => {
                message = Some(list.join("\n"));
            }
            _ => {}
        }

        if message.is_none() && field_errors.is_empty() {
            message = envelope.title.filter(|t| !t.trim().is_empty());
        }

        Self {
            status,
            message,
            field_errors,
        }
    }

    /// Build a rejection from an error response body that may not be JSON.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
            .map(|envelope| Self::from_envelope(Some(status), envelope))
            .unwrap_or_default();

        if parsed.message.is_none() && parsed.field_errors.is_empty() {
            return Self {
                status: Some(status),
                message: Some(format!("Server returned {}", status)),
                field_errors: BTreeMap::new(),
            };
        }
        parsed
    }

    /// Pick the rendering channel. A non-empty field map wins over the
    /// message; the two are never shown together.
    pub fn display(&self, fallback: &str) -> RejectionDisplay {
        if self.field_errors.is_empty() {
            return RejectionDisplay::Message(
                self.message.clone().unwrap_or_else(|| fallback.to_string()),
            );
        }

        let mut fields: BTreeMap<Field, Vec<String>> = BTreeMap::new();
        let mut general = Vec::new();
        for (key, messages) in &self.field_errors {
            match Field::from_server_key(key) {
                Some(field) => fields.entry(field).or_default().extend(messages.iter().cloned()),
                None => general.extend(messages.iter().cloned()),
            }
        }
        RejectionDisplay::FieldErrors { fields, general }
    }

    /// Everything collapsed into one alert-style string.
    pub fn summary(&self, fallback: &str) -> String {
        if let Some(ref message) = self.message {
            return message.clone();
        }
        let all: Vec<&str> = self
            .field_errors
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        if all.is_empty() {
            fallback.to_string()
        } else {
            all.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_rejection() -> Rejection {
        let mut field_errors = BTreeMap::new();
        field_errors.insert("email".to_string(), vec!["Email already in use".to_string()]);
        Rejection {
            status: Some(400),
            message: None,
            field_errors,
        }
    }

    #[test]
    fn test_display_prefers_field_errors() {
        let mut rejection = field_rejection();
        rejection.message = Some("Validation failed".to_string());

        match rejection.display("Registration failed") {
            RejectionDisplay::FieldErrors { fields, general } => {
                assert_eq!(fields[&Field::Email], vec!["Email already in use".to_string()]);
                assert!(general.is_empty());
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_display_unknown_keys_go_to_general() {
        let mut rejection = field_rejection();
        rejection
            .field_errors
            .insert("roleId".to_string(), vec!["Invalid role".to_string()]);

        let RejectionDisplay::FieldErrors { general, .. } = rejection.display("x") else {
            panic!("expected field errors");
        };
        assert_eq!(general, vec!["Invalid role".to_string()]);
    }

    #[test]
    fn test_display_message_and_fallback() {
        assert_eq!(
            Rejection::with_message("Invalid credentials").display("Login failed"),
            RejectionDisplay::Message("Invalid credentials".to_string())
        );
        assert_eq!(
            Rejection::default().display("Login failed"),
            RejectionDisplay::Message("Login failed".to_string())
        );
    }

    #[test]
    fn test_summary_flattens_field_errors() {
        let mut rejection = field_rejection();
        rejection
            .field_errors
            .insert("password".to_string(), vec!["Too short".to_string()]);
        assert_eq!(rejection.summary("x"), "Email already in use\nToo short");
    }

    #[test]
    fn test_from_body_non_json() {
        let rejection = Rejection::from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(rejection.status, Some(502));
        assert_eq!(rejection.message.as_deref(), Some("Server returned 502"));
    }

    #[test]
    fn test_from_body_problem_details() {
        let body = r#"{
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": { "Email": ["The Email field is not a valid e-mail address."] }
        }"#;
        let rejection = Rejection::from_body(400, body);
        assert!(rejection.message.is_none());
        assert_eq!(rejection.field_errors.len(), 1);
    }

    #[test]
    fn test_from_body_message_only() {
        let rejection = Rejection::from_body(401, r#"{"succeeded":false,"message":"Invalid credentials"}"#);
        assert_eq!(rejection.message.as_deref(), Some("Invalid credentials"));
        assert_eq!(rejection.status, Some(401));
    }

    #[test]
    fn test_failure_message_variants() {
        let net: AuthOutcome<()> = AuthOutcome::NetworkFailure {
            reason: "connection refused".to_string(),
        };
        assert_eq!(net.failure_message("x").as_deref(), Some(CONNECTIVITY_MESSAGE));

        let ok: AuthOutcome<()> = AuthOutcome::Success(());
        assert!(ok.failure_message("x").is_none());

        let invalid: AuthOutcome<()> = AuthOutcome::Invalid(ValidationError::PasswordMismatch);
        assert_eq!(invalid.failure_message("x").as_deref(), Some("Passwords do not match"));
    }

    #[test]
    fn test_map_keeps_failures() {
        let rejected: AuthOutcome<u8> = AuthOutcome::Rejected(Rejection::with_message("no"));
        let mapped = rejected.map(|n| n.to_string());
        assert!(matches!(mapped, AuthOutcome::Rejected(_)));
        assert_eq!(AuthOutcome::Success(2u8).map(|n| n * 2), AuthOutcome::Success(4));
    }
}
