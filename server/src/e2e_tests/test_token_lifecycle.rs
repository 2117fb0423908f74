//! End-to-end tests for a token's life: login, use, expiry.
//!
//! These tests verify:
//! 1. A fresh token passes the gate
//! 2. The same token keeps passing until just before five minutes
//! 3. From five minutes on the gate reports expiry

use std::time::Duration;

use axum::http::StatusCode;

use crate::auth::TOKEN_TTL;
use crate::e2e_tests::helpers::TestApp;
use crate::server::PROTECTED_GREETING;

#[tokio::test]
async fn test_login_then_access_protected() {
    let app = TestApp::new();

    let token = app.login("user1", "pass1").await.token();
    let response = app.get_protected_with_token(&token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, PROTECTED_GREETING);
}

#[tokio::test]
async fn test_token_reusable_within_ttl() {
    let app = TestApp::new();
    let token = app.login("user2", "pass2").await.token();

    for _ in 0..4 {
        app.clock.advance(Duration::from_secs(60));
        let response = app.get_protected_with_token(&token).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    app.clock.advance(Duration::from_secs(59));
    let response = app.get_protected_with_token(&token).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_expires_after_ttl() {
    let app = TestApp::new();
    let token = app.login("user1", "pass1").await.token();

    app.clock.advance(TOKEN_TTL);
    let response = app.get_protected_with_token(&token).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, "Authentication token has expired");

    app.clock.advance(Duration::from_secs(3600));
    let response = app.get_protected_with_token(&token).await;
    assert_eq!(response.body, "Authentication token has expired");
}

#[tokio::test]
async fn test_new_login_after_expiry() {
    let app = TestApp::new();
    let old = app.login("user1", "pass1").await.token();

    app.clock.advance(TOKEN_TTL + Duration::from_secs(1));
    let fresh = app.login("user1", "pass1").await.token();

    assert_ne!(old, fresh);
    assert_eq!(
        app.get_protected_with_token(&old).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get_protected_with_token(&fresh).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_token_survives_new_app_with_same_key() {
    // Validity depends only on signature and expiry, not on the issuing instance.
    let first = TestApp::new();
    let token = first.login("user1", "pass1").await.token();

    let second = TestApp::new();
    let response = second.get_protected_with_token(&token).await;

    assert_eq!(response.status, StatusCode::OK);
}
