//! Principals and the read-only credential store.
//!
//! # Pre-conditions
//! - Principal identifiers are unique within a store.
//!
//! # Post-conditions
//! - Lookups never mutate the store.
//!
//! # Invariants
//! - A store's contents are fixed once it is constructed.

use std::collections::HashMap;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Secret checked against when the username is unknown, so both failure
/// paths hash and compare the same amount of data.
const DECOY_SECRET: &str = "token-gate-decoy-secret";

/// An authenticatable identity and the secret it proves itself with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique, stable identifier (the username).
    pub identifier: String,
    /// Opaque comparison value.
    pub secret: String,
}

impl Principal {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

/// Login request payload.
#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Error returned when credentials do not match a principal.
///
/// Both variants are reported identically to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// No principal has the given identifier.
    NotFound,
    /// The principal exists but the secret differs.
    Mismatch,
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "unknown principal"),
            Self::Mismatch => write!(f, "secret mismatch"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// A read-only source of principals.
///
/// Implementations must be safe to share between concurrent requests.
pub trait CredentialStore: Send + Sync {
    /// Find the principal with the given identifier.
    fn lookup(&self, identifier: &str) -> Option<Principal>;
}

/// In-memory store backed by a fixed map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    principals: HashMap<String, Principal>,
}

impl StaticCredentialStore {
    /// Build a store from a list of principals.
    ///
    /// If an identifier appears more than once the last entry wins, so the
    /// store always holds unique identifiers.
    pub fn new(principals: impl IntoIterator<Item = Principal>) -> Self {
        let principals = principals
            .into_iter()
            .map(|principal| (principal.identifier.clone(), principal))
            .collect();
        Self { principals }
    }

    /// The two accounts preloaded at process start.
    #[must_use]
    pub fn with_default_accounts() -> Self {
        Self::new([
            Principal::new("user1", "pass1"),
            Principal::new("user2", "pass2"),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// Iterate over all principals in unspecified order.
    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.principals.values()
    }
}

impl CredentialStore for StaticCredentialStore {
    fn lookup(&self, identifier: &str) -> Option<Principal> {
        self.principals.get(identifier).cloned()
    }
}

/// Compare two secrets in time independent of where they differ.
///
/// Both sides are hashed first so the comparison always covers 32 bytes,
/// whatever the input lengths.
fn secrets_match(expected: &str, presented: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected
        .iter()
        .zip(presented.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Check a login attempt against the store.
///
/// An unknown username still goes through a secret comparison, against a
/// decoy, so the two failures take the same path.
///
/// # Errors
/// Returns `CredentialError::NotFound` for an unknown username and
/// `CredentialError::Mismatch` for a wrong password.
pub fn verify_credentials(
    store: &dyn CredentialStore,
    credentials: &Credentials,
) -> Result<Principal, CredentialError> {
    match store.lookup(&credentials.username) {
        Some(principal) if secrets_match(&principal.secret, &credentials.password) => {
            Ok(principal)
        }
        Some(_) => Err(CredentialError::Mismatch),
        None => {
            let _ = std::hint::black_box(secrets_match(DECOY_SECRET, &credentials.password));
            Err(CredentialError::NotFound)
        }
    }
}
