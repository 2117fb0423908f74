//! Behavior when the application is built with an empty signing key.
//!
//! `ServerConfig` refuses to start without a key, but `AppState` can still be
//! constructed directly; both halves must then fail closed.

use axum::http::StatusCode;

use crate::auth::{Principal, SigningKey, TokenIssuer};
use crate::e2e_tests::helpers::TestApp;

#[tokio::test]
async fn test_login_reports_server_error() {
    let app = TestApp::with_key(SigningKey::unchecked(""));

    let response = app.login("user1", "pass1").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Failed to generate token");
}

#[tokio::test]
async fn test_bad_credentials_still_unauthorized() {
    let app = TestApp::with_key(SigningKey::unchecked(""));

    let response = app.login("user1", "wrong").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_refuses_everything() {
    let app = TestApp::with_key(SigningKey::unchecked(""));
    let token = TokenIssuer::new(SigningKey::new("any").expect("valid secret"))
        .issue(&Principal::new("user1", "pass1"))
        .expect("issued token");

    let response = app.get_protected_with_token(&token).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Token verification unavailable");
}
