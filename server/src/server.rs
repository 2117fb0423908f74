// Life of a request:
// 1. `POST /authenticate` checks credentials against the store and, on a
//    match, returns a token from the issuer.
// 2. Every other route sits behind the gate pipeline:
//     - Extract `Authorization: Bearer <token>`
//     - Verify signature, then expiry
//     - Forward to the handler, or answer 403
//
// No state is written after startup; every request is independent.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::auth::{
    Clock, CredentialStore, SigningKey, StaticCredentialStore, SystemClock, TokenIssuer,
    TokenVerifier,
};
use crate::config::ServerConfig;
use crate::gate::AuthenticationGate;
use crate::login::authenticate;
use crate::pipeline::Pipeline;

/// Body returned by the sample protected route.
pub const PROTECTED_GREETING: &str = "Congratulations! This is a protected endpoint.";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Source of principals for login.
    pub credentials: Arc<dyn CredentialStore>,
    /// Signs tokens for successful logins.
    pub issuer: Arc<TokenIssuer>,
    /// Checks tokens presented to gated routes.
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, signing_key: SigningKey) -> Self {
        Self::with_clock(credentials, signing_key, Arc::new(SystemClock))
    }

    /// State whose issuer and verifier read time from `clock`.
    #[must_use]
    pub fn with_clock(
        credentials: Arc<dyn CredentialStore>,
        signing_key: SigningKey,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            issuer: Arc::new(TokenIssuer::with_clock(
                signing_key.clone(),
                Arc::clone(&clock),
            )),
            verifier: Arc::new(TokenVerifier::with_clock(signing_key, clock)),
        }
    }

    /// State for a configured server with the preloaded accounts.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(StaticCredentialStore::with_default_accounts()),
            config.signing_key.clone(),
        )
    }

    /// The gate stage guarding protected routes.
    #[must_use]
    pub fn gate(&self) -> AuthenticationGate {
        AuthenticationGate::new(TokenVerifier::clone(&self.verifier))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("issuer", &self.issuer)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

/// Put the authentication gate in front of every route on `protected`.
///
/// Any router works here; the gate does not care what the handlers do.
pub fn gated(state: &AppState, protected: Router<AppState>) -> Router<AppState> {
    Pipeline::new().stage(state.gate()).wrap(protected)
}

/// Build the full application: the public login route plus the gated routes.
pub fn app(state: AppState) -> Router {
    let protected = Router::<AppState>::new().route("/protected", get(protected_endpoint));

    Router::<AppState>::new()
        .route("/authenticate", post(authenticate))
        .merge(gated(&state, protected))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /protected`
async fn protected_endpoint() -> &'static str {
    PROTECTED_GREETING
}
