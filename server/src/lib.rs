#![cfg_attr(test, allow(clippy::expect_used))]
//! Bearer-token authentication gate.
//!
//! System components:
//!  - Credential store (read-only principal lookup)
//!  - Token issuer and verifier (HS256 JWT, five minute lifetime)
//!  - Authentication gate (request pipeline stage)
//!  - Login endpoint

pub mod auth;
pub mod config;
pub mod gate;
pub mod login;
pub mod pipeline;
pub mod server;

#[cfg(test)]
mod testing;

pub use gate::{AuthenticatedPrincipal, AuthenticationGate, GateError};
pub use pipeline::{Interception, Pipeline, RequestStage};
pub use server::{AppState, app, gated};
