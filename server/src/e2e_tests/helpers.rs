//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use tower::ServiceExt;

use crate::auth::{SigningKey, StaticCredentialStore};
use crate::server::{AppState, app};
use crate::testing::ManualClock;

pub const TEST_SECRET: &str = "e2e-test-secret-key";

/// Status and body of a finished response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        Self {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Token from a successful login response.
    #[must_use]
    pub fn token(&self) -> String {
        assert_eq!(self.status, StatusCode::OK, "login failed: {}", self.body);
        let value: serde_json::Value = serde_json::from_str(&self.body).expect("JSON body");
        let token = value["token"].as_str().expect("token field");
        token.to_string()
    }
}

/// The full application wired to a controllable clock.
pub struct TestApp {
    pub clock: Arc<ManualClock>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Application with the default accounts and a fixed test secret.
    #[must_use]
    pub fn new() -> Self {
        let key = SigningKey::new(TEST_SECRET).expect("valid secret");
        Self::with_key(key)
    }

    /// Application signing and verifying with `key`, which may be empty.
    #[must_use]
    pub fn with_key(key: SigningKey) -> Self {
        let clock = Arc::new(ManualClock::default());
        let state = AppState::with_clock(
            Arc::new(StaticCredentialStore::with_default_accounts()),
            key,
            clock.clone(),
        );
        let router = app(state.clone());
        Self {
            clock,
            state,
            router,
        }
    }

    /// Send a request through a fresh clone of the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        TestResponse::read(response).await
    }

    /// `POST /authenticate` with a raw body.
    pub async fn post_authenticate(&self, body: impl Into<Body>) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/authenticate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("valid request");
        self.send(request).await
    }

    /// `POST /authenticate` with a username and password.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "username": username, "password": password });
        self.post_authenticate(body.to_string()).await
    }

    /// `GET /protected` with an optional raw `Authorization` header value.
    pub async fn get_protected(&self, authorization: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(Body::empty()).expect("valid request");
        self.send(request).await
    }

    /// `GET /protected` with `Authorization: Bearer <token>`.
    pub async fn get_protected_with_token(&self, token: &str) -> TestResponse {
        self.get_protected(Some(&format!("Bearer {token}"))).await
    }
}
