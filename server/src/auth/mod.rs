//! Authentication module.
//!
//! This module provides the credential store, the signing key, and token
//! issuance and verification for the gate.
//!
//! # Pre-conditions
//! - The signing key is loaded once at startup.
//!
//! # Post-conditions
//! - Authentication state is immutable once loaded.
//!
//! # Invariants
//! - No server-side session state exists; a token's validity depends only on
//!   its signature and expiry.

pub mod clock;
pub mod credentials;
pub mod jwt;
pub mod signing_key;

pub use clock::{Clock, SystemClock};
pub use credentials::{
    CredentialError, CredentialStore, Credentials, Principal, StaticCredentialStore,
    verify_credentials,
};
pub use jwt::{SigningError, TOKEN_TTL, TokenIssuer, TokenVerifier, VerificationError};
pub use signing_key::{SigningKey, SigningKeyError};
