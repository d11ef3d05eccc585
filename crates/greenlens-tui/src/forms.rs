//! Screen-local form state for the Login, Register and ForgotPassword screens.
//!
//! Nothing here is persisted. A form is reset whenever its screen is left.

use std::collections::BTreeMap;

use greenlens_core::api::{AuthOutcome, RegisterRequest, RejectionDisplay, Role, CONNECTIVITY_MESSAGE};
use greenlens_core::validation::{Field, ValidationError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email and username input (RFC 5321 address limit).
const MAX_IDENTIFIER_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Check if a character is valid for text input (printable, non-control)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email/username character should be accepted
pub fn can_add_identifier_char(current_len: usize, c: char) -> bool {
    current_len < MAX_IDENTIFIER_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Move through a fixed focus order, wrapping at both ends.
fn cycle<T: Copy + PartialEq>(order: &[T], current: T, forward: bool) -> T {
    let idx = order.iter().position(|f| *f == current).unwrap_or(0);
    let len = order.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    order[next]
}

// ============================================================================
// Errors
// ============================================================================

/// Errors shown on a form: one general line at the top, or per-field lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub general: Option<String>,
    pub fields: BTreeMap<Field, String>,
}

impl FormErrors {
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn from_validation(error: &ValidationError) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(error.field(), error.to_string());
        Self {
            general: None,
            fields,
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            general: Some(message.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Translate a failed outcome into what the form should show.
    /// `fallback` is used when a rejection carries no message at all.
    pub fn from_outcome<T>(outcome: &AuthOutcome<T>, fallback: &str) -> Self {
        match outcome {
            AuthOutcome::Success(_) => Self::default(),
            AuthOutcome::Invalid(e) => Self::from_validation(e),
            AuthOutcome::Rejected(rejection) => match rejection.display(fallback) {
                RejectionDisplay::Message(message) => Self::general(message),
                RejectionDisplay::FieldErrors { fields, general } => Self {
                    general: (!general.is_empty()).then(|| general.join("; ")),
                    fields: fields
                        .into_iter()
                        .map(|(field, messages)| (field, messages.join("; ")))
                        .collect(),
                },
            },
            AuthOutcome::NetworkFailure { .. } => Self::general(CONNECTIVITY_MESSAGE),
            AuthOutcome::Failed { reason } => Self::general(reason.clone()),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Submit,
    RegisterLink,
    ForgotLink,
}

const LOGIN_ORDER: &[LoginFocus] = &[
    LoginFocus::Email,
    LoginFocus::Password,
    LoginFocus::Submit,
    LoginFocus::RegisterLink,
    LoginFocus::ForgotLink,
];

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginFocus,
    pub errors: FormErrors,
}

impl LoginForm {
    /// Start a form, prefilled with the last email used.
    pub fn new(email: Option<String>) -> Self {
        let email = email.unwrap_or_default();
        let focus = if email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        Self {
            email,
            password: String::new(),
            focus,
            errors: FormErrors::default(),
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = cycle(LOGIN_ORDER, self.focus, true);
    }

    pub fn prev_focus(&mut self) {
        self.focus = cycle(LOGIN_ORDER, self.focus, false);
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            LoginFocus::Email if can_add_identifier_char(self.email.chars().count(), c) => {
                self.email.push(c)
            }
            LoginFocus::Password if can_add_password_char(self.password.chars().count(), c) => {
                self.password.push(c)
            }
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            LoginFocus::Email => {
                self.email.pop();
            }
            LoginFocus::Password => {
                self.password.pop();
            }
            _ => {}
        }
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Email,
    Username,
    Password,
    ConfirmPassword,
    Role,
    Submit,
    BackLink,
}

const REGISTER_ORDER: &[RegisterFocus] = &[
    RegisterFocus::Email,
    RegisterFocus::Username,
    RegisterFocus::Password,
    RegisterFocus::ConfirmPassword,
    RegisterFocus::Role,
    RegisterFocus::Submit,
    RegisterFocus::BackLink,
];

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub focus: RegisterFocus,
    pub errors: FormErrors,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            username: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: Role::default(),
            focus: RegisterFocus::Email,
            errors: FormErrors::default(),
        }
    }
}

impl RegisterForm {
    pub fn next_focus(&mut self) {
        self.focus = cycle(REGISTER_ORDER, self.focus, true);
    }

    pub fn prev_focus(&mut self) {
        self.focus = cycle(REGISTER_ORDER, self.focus, false);
    }

    pub fn toggle_role(&mut self) {
        self.role = self.role.toggle();
    }

    fn focused_text(&mut self) -> Option<(&mut String, bool)> {
        match self.focus {
            RegisterFocus::Email => Some((&mut self.email, false)),
            RegisterFocus::Username => Some((&mut self.username, false)),
            RegisterFocus::Password => Some((&mut self.password, true)),
            RegisterFocus::ConfirmPassword => Some((&mut self.confirm_password, true)),
            _ => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some((text, secret)) = self.focused_text() {
            let len = text.chars().count();
            let allowed = if secret {
                can_add_password_char(len, c)
            } else {
                can_add_identifier_char(len, c)
            };
            if allowed {
                text.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some((text, _)) = self.focused_text() {
            text.pop();
        }
    }

    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.email.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            role: self.role,
        }
    }
}

// ============================================================================
// Forgot password
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgotFocus {
    Email,
    Submit,
    BackLink,
}

const FORGOT_ORDER: &[ForgotFocus] = &[ForgotFocus::Email, ForgotFocus::Submit, ForgotFocus::BackLink];

#[derive(Debug, Clone)]
pub struct ForgotPasswordForm {
    pub email: String,
    pub focus: ForgotFocus,
    pub errors: FormErrors,
}

impl Default for ForgotPasswordForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            focus: ForgotFocus::Email,
            errors: FormErrors::default(),
        }
    }
}

impl ForgotPasswordForm {
    pub fn next_focus(&mut self) {
        self.focus = cycle(FORGOT_ORDER, self.focus, true);
    }

    pub fn prev_focus(&mut self) {
        self.focus = cycle(FORGOT_ORDER, self.focus, false);
    }

    pub fn push_char(&mut self, c: char) {
        if self.focus == ForgotFocus::Email && can_add_identifier_char(self.email.chars().count(), c) {
            self.email.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus == ForgotFocus::Email {
            self.email.pop();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
