//! Request and response shapes of the `/api/Auth` endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Account role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Grower,
}

impl Role {
    /// Numeric id the backend expects in `roleId`.
    pub fn id(&self) -> u8 {
        match self {
            Role::User => 2,
            Role::Grower => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Plant lover",
            Role::Grower => "Grower",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Role::User => Role::Grower,
            Role::Grower => Role::User,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterPayload<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub role_id: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordPayload<'a> {
    pub email: &'a str,
}

/// The `{ succeeded, message, data, errors }` wrapper every endpoint returns.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<ServerErrors>,
    /// ASP.NET problem-details responses put their summary here
    #[serde(default)]
    pub title: Option<String>,
}

/// `errors` comes either as a field map or as a bare list of messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ServerErrors {
    Fields(BTreeMap<String, Vec<String>>),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: UserProfile,
}

/// The signed-in user as described by the login response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_email_confirmed: Option<bool>,
}

impl UserProfile {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(s)) => s,
        Some(Id::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
