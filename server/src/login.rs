//! Login endpoint.
//!
//! Exchanges a username and password for a signed token.
//!
//! # Post-conditions
//! - An unknown username and a wrong password produce byte-identical
//!   responses.
//! - Only a successful login produces a token.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialError, Credentials, SigningError, verify_credentials};
use crate::server::AppState;

/// Body of a successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Error returned when a request body cannot be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// The body is not a JSON object with string `username` and `password`.
    Malformed,
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed request body"),
        }
    }
}

impl std::error::Error for PayloadError {}

/// Every way a login can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    Payload(PayloadError),
    Credentials(CredentialError),
    Signing(SigningError),
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payload(e) => write!(f, "payload error: {e}"),
            Self::Credentials(e) => write!(f, "credential error: {e}"),
            Self::Signing(e) => write!(f, "signing error: {e}"),
        }
    }
}

impl std::error::Error for LoginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload(e) => Some(e),
            Self::Credentials(e) => Some(e),
            Self::Signing(e) => Some(e),
        }
    }
}

impl From<PayloadError> for LoginError {
    fn from(e: PayloadError) -> Self {
        Self::Payload(e)
    }
}

impl From<CredentialError> for LoginError {
    fn from(e: CredentialError) -> Self {
        Self::Credentials(e)
    }
}

impl From<SigningError> for LoginError {
    fn from(e: SigningError) -> Self {
        Self::Signing(e)
    }
}

impl LoginError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Payload(_) => StatusCode::BAD_REQUEST,
            Self::Credentials(_) => StatusCode::UNAUTHORIZED,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Credential failures share one message so the
    /// response does not reveal whether the username exists.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Payload(_) => "Invalid request body",
            Self::Credentials(_) => "Invalid username or password",
            Self::Signing(_) => "Failed to generate token",
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        (self.status_code(), self.message()).into_response()
    }
}

/// Parse a login body.
///
/// # Errors
/// Returns `PayloadError::Malformed` if the body is not valid credentials JSON.
pub fn parse_credentials(body: &[u8]) -> Result<Credentials, PayloadError> {
    serde_json::from_slice(body).map_err(|_| PayloadError::Malformed)
}

/// `POST /authenticate`
pub async fn authenticate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, LoginError> {
    let credentials = parse_credentials(&body).inspect_err(|e| {
        tracing::debug!("rejected login body: {e}");
    })?;

    let principal = verify_credentials(state.credentials.as_ref(), &credentials).inspect_err(
        |e| {
            tracing::warn!(username = %credentials.username, "login failed: {e}");
        },
    )?;

    let token = state.issuer.issue(&principal).inspect_err(|e| {
        tracing::error!(username = %principal.identifier, "failed to issue token: {e}");
    })?;

    tracing::info!(username = %principal.identifier, "issued token");
    Ok(Json(TokenResponse { token }))
}
