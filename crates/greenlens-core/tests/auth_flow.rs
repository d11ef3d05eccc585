//! Integration tests for the auth client and session gate against a mock API.

use std::time::Duration;

use greenlens_core::api::{AuthClient, AuthOutcome, RegisterRequest, RejectionDisplay, Role};
use greenlens_core::navigation::{reachable_screens, Navigator, Screen};
use greenlens_core::session::{SessionGate, SessionState};
use greenlens_core::storage::{
    FileTokenStore, MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
use greenlens_core::validation::{Field, ValidationError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PASSWORD: &str = "Secret#123";

fn login_ok(confirmed: Option<bool>) -> serde_json::Value {
    let mut user = json!({ "id": "u-1", "email": "ann@example.com", "username": "ann" });
    if let Some(flag) = confirmed {
        user["isEmailConfirmed"] = json!(flag);
    }
    json!({
        "succeeded": true,
        "message": "Login successful",
        "data": { "accessToken": "abc123", "refreshToken": "refresh-1", "user": user }
    })
}

async fn resolved_gate() -> SessionGate<MemoryTokenStore> {
    let mut gate = SessionGate::new(MemoryTokenStore::new());
    gate.restore().await.unwrap();
    gate
}

// ----------------------------------------------------------------------------
// Login
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_login_success_persists_then_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .and(body_json(json!({ "email": "ann@example.com", "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(Some(true))))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let mut gate = resolved_gate().await;
    let mut nav = Navigator::new(gate.state());

    // Identifier is trimmed before sending
    let outcome = client.login("  ann@example.com ", PASSWORD).await;
    let AuthOutcome::Success(success) = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert_eq!(success.user.username, "ann");

    gate.mark_logged_in(&success.tokens).await.unwrap();
    assert_eq!(gate.state(), SessionState::Authenticated);
    assert_eq!(
        gate.store().get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
        Some("abc123")
    );
    assert_eq!(
        gate.store().get(REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("refresh-1")
    );

    nav.sync(gate.state());
    assert_eq!(nav.current(), Some(Screen::Home));
}

#[tokio::test]
async fn test_login_without_confirmation_flag_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(None)))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    assert!(client.login("ann@example.com", PASSWORD).await.is_success());
}

#[tokio::test]
async fn test_login_unconfirmed_email_yields_no_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(Some(false))))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let gate = resolved_gate().await;

    let outcome = client.login("ann@example.com", PASSWORD).await;
    match outcome {
        AuthOutcome::Rejected(r) => {
            assert!(r.message.unwrap().contains("not confirmed"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(gate.state(), SessionState::Unauthenticated);
    assert_eq!(gate.store().get(ACCESS_TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_login_rejected_message_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "succeeded": false, "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let gate = resolved_gate().await;

    let AuthOutcome::Rejected(rejection) = client.login("ann@example.com", PASSWORD).await else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejection.display("Login failed"),
        RejectionDisplay::Message("Invalid credentials".to_string())
    );
    assert_eq!(gate.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_login_http_401_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "succeeded": false, "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    match client.login("ann@example.com", PASSWORD).await {
        AuthOutcome::Rejected(r) => {
            assert_eq!(r.status, Some(401));
            assert_eq!(r.message.as_deref(), Some("Invalid credentials"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_validation_never_calls_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(Some(true))))
        .expect(0)
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();

    assert_eq!(
        client.login("", PASSWORD).await,
        AuthOutcome::Invalid(ValidationError::MissingField(Field::Email))
    );
    assert_eq!(
        client.login("ann@example.com", "").await,
        AuthOutcome::Invalid(ValidationError::MissingField(Field::Password))
    );
    assert_eq!(
        client.login("ann@example.com", "lowercase1!").await,
        AuthOutcome::Invalid(ValidationError::PasswordPolicy)
    );
}

#[tokio::test]
async fn test_login_success_without_tokens_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "message": "ok",
            "data": { "user": { "id": "1", "email": "a@b.c", "username": "a" } }
        })))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    assert!(matches!(
        client.login("a@b.c", PASSWORD).await,
        AuthOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn test_login_undecodable_success_body_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    assert!(matches!(
        client.login("a@b.c", PASSWORD).await,
        AuthOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn test_rate_limited_login_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(Some(true))))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri())
        .unwrap()
        .with_retry_backoff(Duration::from_millis(1));
    assert!(client.login("ann@example.com", PASSWORD).await.is_success());
}

// ----------------------------------------------------------------------------
// Network failures
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AuthClient::new(&format!("http://{}", addr)).unwrap();
    let outcome = client.request_password_reset("ann@example.com").await;
    assert!(
        matches!(outcome, AuthOutcome::NetworkFailure { .. }),
        "expected network failure, got {:?}",
        outcome
    );
    assert_eq!(
        outcome.failure_message("x").as_deref(),
        Some(greenlens_core::api::CONNECTIVITY_MESSAGE)
    );
}

// ----------------------------------------------------------------------------
// Registration
// ----------------------------------------------------------------------------

fn registration() -> RegisterRequest {
    RegisterRequest {
        email: "ann@example.com".to_string(),
        username: "ann".to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        role: Role::default(),
    }
}

#[tokio::test]
async fn test_register_sends_default_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/register"))
        .and(body_json(json!({
            "email": "ann@example.com",
            "username": "ann",
            "password": PASSWORD,
            "roleId": 2
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "succeeded": true, "message": "Registered" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    assert_eq!(
        client.register(&registration()).await,
        AuthOutcome::Success("Registered".to_string())
    );
}

#[tokio::test]
async fn test_register_field_errors_render_per_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "succeeded": false,
            "errors": { "email": ["Email already in use"] }
        })))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let AuthOutcome::Rejected(rejection) = client.register(&registration()).await else {
        panic!("expected rejection");
    };

    match rejection.display("Registration failed") {
        RejectionDisplay::FieldErrors { fields, general } => {
            assert_eq!(fields[&Field::Email], vec!["Email already in use".to_string()]);
            assert!(general.is_empty());
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_mismatch_never_calls_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let mut request = registration();
    request.confirm_password = "Secret#124".to_string();

    assert_eq!(
        client.register(&request).await,
        AuthOutcome::Invalid(ValidationError::PasswordMismatch)
    );
}

// ----------------------------------------------------------------------------
// Password reset
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_password_reset_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/forgot-password"))
        .and(body_json(json!({ "email": "ann@example.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "succeeded": true, "message": "Reset email sent" })),
        )
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    assert_eq!(
        client.request_password_reset("ann@example.com").await,
        AuthOutcome::Success("Reset email sent".to_string())
    );
}

#[tokio::test]
async fn test_password_reset_rejected_with_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/forgot-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "succeeded": false })))
        .mount(&server)
        .await;

    let client = AuthClient::new(&server.uri()).unwrap();
    let AuthOutcome::Rejected(rejection) = client.request_password_reset("a@b.c").await else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejection.display("Could not send reset email"),
        RejectionDisplay::Message("Could not send reset email".to_string())
    );
}

// ----------------------------------------------------------------------------
// Boot
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_boot_with_stored_token_shows_only_home() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("tokens.json"));
    store.set(ACCESS_TOKEN_KEY, "abc123").await.unwrap();

    // Simulate a restart with a fresh store over the same file
    let mut gate = SessionGate::new(FileTokenStore::new(dir.path().join("tokens.json")));
    let mut nav = Navigator::new(gate.state());
    assert_eq!(nav.current(), None);

    let state = gate.restore().await.unwrap();
    assert_eq!(state, SessionState::Authenticated);

    nav.sync(state);
    assert_eq!(nav.current(), Some(Screen::Home));
    assert_eq!(reachable_screens(state), &[Screen::Home]);
}

#[tokio::test]
async fn test_logout_then_reboot_is_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tokens.json");

    let mut gate = SessionGate::new(FileTokenStore::new(&file));
    gate.restore().await.unwrap();
    gate.mark_logged_in(&greenlens_core::StoredTokens {
        access_token: "abc123".to_string(),
        refresh_token: "refresh-1".to_string(),
    })
    .await
    .unwrap();
    gate.mark_logged_out().await.unwrap();

    let mut rebooted = SessionGate::new(FileTokenStore::new(&file));
    assert_eq!(
        rebooted.restore().await.unwrap(),
        SessionState::Unauthenticated
    );
}
