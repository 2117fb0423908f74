//! Authentication gate.
//!
//! A pipeline stage that admits a request only when it carries a valid bearer
//! token in its `Authorization` header.
//!
//! # Pre-conditions
//! - The gate's verifier holds the same signing key the issuer signs with.
//!
//! # Post-conditions
//! - A forwarded request carries an `AuthenticatedPrincipal` extension.
//! - A rejected request is answered with a plain-text reason and never
//!   reaches the downstream handler.
//!
//! # Invariants
//! - The gate forwards a request iff the token verifies.
//! - Responses never contain the token, the signing key, or library errors.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};

use crate::auth::{TokenVerifier, VerificationError};
use crate::pipeline::{Interception, RequestStage};

/// The only accepted authorization scheme, compared case-insensitively.
pub const AUTHORIZATION_SCHEME: &str = "Bearer";

/// Identity established by the gate, available to handlers as a request
/// extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No `Authorization` header, or an empty one.
    Missing,
    /// The header is not `<scheme> <token>` with the bearer scheme.
    Malformed,
    /// The token failed verification.
    Rejected(VerificationError),
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing authorization header"),
            Self::Malformed => write!(f, "malformed authorization header"),
            Self::Rejected(reason) => write!(f, "token rejected: {reason}"),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Missing | Self::Malformed => None,
        }
    }
}

impl GateError {
    /// HTTP status for this failure.
    ///
    /// A verifier without a key is a server fault, everything else is the
    /// client's.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(VerificationError::MissingKey) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Missing | Self::Malformed | Self::Rejected(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Plain-text reason sent to the client.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Missing => "Missing auth token",
            Self::Malformed => "Invalid/Malformed auth token",
            Self::Rejected(VerificationError::Malformed) => "Malformed authentication token",
            Self::Rejected(VerificationError::BadSignature) => {
                "Invalid authentication token signature"
            }
            Self::Rejected(VerificationError::Expired) => "Authentication token has expired",
            Self::Rejected(VerificationError::MissingKey) => "Token verification unavailable",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        (self.status_code(), self.message()).into_response()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// # Errors
/// Returns `GateError::Missing` for an absent or blank header and
/// `GateError::Malformed` for anything that is not exactly two
/// whitespace-separated parts with the bearer scheme.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers.get(AUTHORIZATION).ok_or(GateError::Missing)?;
    let value = value.to_str().map_err(|_| GateError::Malformed)?;
    if value.trim().is_empty() {
        return Err(GateError::Missing);
    }

    let mut parts = value.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GateError::Malformed);
    };
    if !scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME) {
        return Err(GateError::Malformed);
    }

    Ok(token)
}

/// Gate stage wrapping a token verifier.
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    verifier: TokenVerifier,
}

impl AuthenticationGate {
    #[must_use]
    pub const fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Decide whether the headers carry a valid token.
    ///
    /// # Errors
    /// Returns the `GateError` describing why the request must be refused.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedPrincipal, GateError> {
        let token = extract_token(headers)?;
        let subject = self.verifier.verify(token).map_err(GateError::Rejected)?;
        Ok(AuthenticatedPrincipal { subject })
    }
}

impl RequestStage for AuthenticationGate {
    fn intercept(&self, request: &mut Request) -> Interception {
        match self.authenticate(request.headers()) {
            Ok(principal) => {
                tracing::debug!(subject = %principal.subject, "request authenticated");
                request.extensions_mut().insert(principal);
                Interception::Forward
            }
            Err(error) => {
                if error.status_code().is_server_error() {
                    tracing::error!(path = %request.uri().path(), "gate misconfigured: {error}");
                } else {
                    tracing::warn!(
                        method = %request.method(),
                        path = %request.uri().path(),
                        "request rejected: {error}"
                    );
                }
                Interception::ShortCircuit(error.into_response())
            }
        }
    }
}
