//! Client-side field validation for the auth forms.
//!
//! Every check here runs before a request is built, so a failing form never
//! touches the network. Errors carry the [`Field`] they belong to so the UI
//! can render them next to the offending input.

use thiserror::Error;

/// Minimum password length accepted by the login policy.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Symbols that satisfy the "at least one special character" rule.
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()_+-[]{};':"\|,.<>/?"#;

/// Form inputs that can carry a validation or server-side error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Email,
    Username,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Username => "Username",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm password",
        }
    }

    /// Match a key from a server `errors` map to a form field.
    /// Keys are compared case-insensitively (`Email`, `email`, `EMAIL`).
    pub fn from_server_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "email" => Some(Field::Email),
            "username" | "user_name" => Some(Field::Username),
            "password" => Some(Field::Password),
            "confirmpassword" | "confirm_password" => Some(Field::ConfirmPassword),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    MissingField(Field),

    #[error("Password must be at least 8 characters and include an uppercase letter and a symbol")]
    PasswordPolicy,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// The input the error should be rendered under.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField(field) => *field,
            ValidationError::PasswordPolicy => Field::Password,
            ValidationError::PasswordMismatch => Field::ConfirmPassword,
        }
    }
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Check the strict password shape: length, one uppercase letter, one symbol.
pub fn check_password_policy(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_upper && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::PasswordPolicy)
    }
}

pub fn validate_login(identifier: &str, password: &str) -> Result<(), ValidationError> {
    require(identifier, Field::Email)?;
    require(password, Field::Password)?;
    check_password_policy(password.trim())
}

pub fn validate_registration(
    email: &str,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    require(email, Field::Email)?;
    require(username, Field::Username)?;
    require(password, Field::Password)?;
    require(confirm_password, Field::ConfirmPassword)?;

    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_reset(email: &str) -> Result<(), ValidationError> {
    require(email, Field::Email)
}
