//! The shared HMAC signing key.
//!
//! # Pre-conditions
//! - Keys built with `SigningKey::new` must not be empty.
//!
//! # Post-conditions
//! - `SigningKey` instances are immutable once created and cheap to clone.
//!
//! # Invariants
//! - Key bytes never appear in `Debug` output or logs.

use std::sync::Arc;

/// Error returned when signing key material is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningKeyError {
    /// The HS256 secret is empty.
    EmptySecret,
}

impl std::fmt::Display for SigningKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "HS256 secret must not be empty"),
        }
    }
}

impl std::error::Error for SigningKeyError {}

/// HMAC-SHA256 secret shared by the token issuer and verifier.
///
/// Cloning shares the underlying bytes, so one key loaded at startup can be
/// handed to every component that needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    secret: Arc<[u8]>,
}

impl SigningKey {
    /// Create a signing key from non-empty secret bytes.
    ///
    /// # Post-conditions
    /// - The returned key is non-empty.
    ///
    /// # Errors
    /// Returns `SigningKeyError::EmptySecret` if the secret is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SigningKeyError::EmptySecret);
        }
        Ok(Self {
            secret: secret.into(),
        })
    }

    /// Create a key without validating it.
    ///
    /// An empty key is representable so that the issuer and verifier can
    /// report `MissingKey` themselves instead of signing with nothing.
    #[must_use]
    pub fn unchecked(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into().into(),
        }
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.secret.len())
            .finish_non_exhaustive()
    }
}
