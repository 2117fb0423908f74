//! JWT issuance and verification.
//!
//! Tokens are HS256-signed JSON Web Tokens carrying the principal identifier
//! in the `sub` claim and a fixed five minute lifetime.
//!
//! # Pre-conditions
//! - The signing key must be non-empty for issuance or verification to succeed.
//!
//! # Post-conditions
//! - On success, `verify` returns the `sub` claim exactly as it was issued.
//! - On failure, a descriptive error indicates what went wrong.
//!
//! # Invariants
//! - A token is valid iff its signature verifies under the signing key and
//!   the current time is strictly before its `exp` claim.
//! - Issuance and verification are stateless and do not modify any external state.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{Clock, Principal, SigningKey, SystemClock};

/// How long an issued token stays valid.
pub const TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Claims carried by every token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject claim containing the principal identifier.
    sub: String,
    /// Issued-at, seconds since the epoch.
    #[serde(default)]
    iat: u64,
    /// Expiry, seconds since the epoch.
    exp: u64,
}

/// Error returned when a token cannot be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The signing key is unset or empty.
    MissingKey,
    /// The JWT library failed to encode the token.
    Encoding(String),
}

impl std::fmt::Display for SigningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey => write!(f, "signing key is not set"),
            Self::Encoding(reason) => write!(f, "failed to encode JWT: {reason}"),
        }
    }
}

impl std::error::Error for SigningError {}

/// Error returned when JWT verification fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// The JWT is malformed or cannot be parsed.
    Malformed,
    /// The JWT signature does not match the signing key.
    BadSignature,
    /// The JWT has expired.
    Expired,
    /// The verifier has no key to check signatures with.
    MissingKey,
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed JWT"),
            Self::BadSignature => write!(f, "invalid JWT signature"),
            Self::Expired => write!(f, "JWT has expired"),
            Self::MissingKey => write!(f, "signing key is not set"),
        }
    }
}

impl std::error::Error for VerificationError {}

/// Produces signed tokens for verified principals.
#[derive(Clone)]
pub struct TokenIssuer {
    key: SigningKey,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(key: SigningKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// Issues a token for the principal, valid for [`TOKEN_TTL`].
    ///
    /// # Errors
    /// Returns `SigningError::MissingKey` if the key is empty, before any
    /// signing is attempted.
    pub fn issue(&self, principal: &Principal) -> Result<String, SigningError> {
        if self.key.is_empty() {
            return Err(SigningError::MissingKey);
        }

        let issued_at = self.clock.now();
        let claims = Claims {
            sub: principal.identifier.clone(),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL.as_secs(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.key.as_bytes()),
        )
        .map_err(|e| SigningError::Encoding(e.to_string()))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Checks presented tokens and recovers their subject.
#[derive(Clone)]
pub struct TokenVerifier {
    key: SigningKey,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(key: SigningKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// Verifies a JWT and extracts the principal identifier from the 'sub' claim.
    ///
    /// The signature is checked before expiry, so an expired token with a
    /// forged signature reports `BadSignature`.
    ///
    /// # Errors
    /// Returns `VerificationError` if verification fails for any reason.
    pub fn verify(&self, token: &str) -> Result<String, VerificationError> {
        if self.key.is_empty() {
            return Err(VerificationError::MissingKey);
        }

        let key = DecodingKey::from_secret(self.key.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against our own clock below, with no leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;
        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(VerificationError::Malformed);
        }
        if self.clock.now() >= claims.exp {
            return Err(VerificationError::Expired);
        }

        Ok(claims.sub)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Maps jsonwebtoken errors to our `VerificationError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> VerificationError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => VerificationError::BadSignature,
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        _ => VerificationError::Malformed,
    }
}
