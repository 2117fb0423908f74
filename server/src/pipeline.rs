//! Request pipeline.
//!
//! A pipeline is an ordered list of stages that run in front of a router's
//! handlers. Each stage either forwards the request to the next stage or
//! answers it directly, in which case nothing after it runs.
//!
//! # Invariants
//! - Stages run in the order they were added.
//! - A short-circuited request never reaches a later stage or the handler.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
};

/// What a stage decided to do with a request.
#[derive(Debug)]
pub enum Interception {
    /// Hand the request on.
    Forward,
    /// Answer immediately with this response.
    ShortCircuit(Response),
}

/// A single step that inspects a request before it reaches its handler.
///
/// Stages may attach request extensions but are otherwise expected to leave
/// the request as they found it.
pub trait RequestStage: Send + Sync + 'static {
    fn intercept(&self, request: &mut Request) -> Interception;
}

/// Builder that composes stages and applies them to a router.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn RequestStage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; it runs after every stage added before it.
    #[must_use]
    pub fn stage(mut self, stage: impl RequestStage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Put the pipeline in front of every route currently on `router`.
    ///
    /// Routes added to the returned router afterwards, or merged in from
    /// elsewhere, are not affected. Unmatched paths fall through to the
    /// router's fallback without running any stage. A router with no routes
    /// is returned as is.
    pub fn wrap<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // route_layer panics on a router without routes.
        if self.stages.is_empty() || !router.has_routes() {
            return router;
        }

        let stages: Arc<[Arc<dyn RequestStage>]> = self.stages.into();
        router.route_layer(middleware::from_fn(move |request: Request, next: Next| {
            let stages = Arc::clone(&stages);
            async move { run_stages(&stages, request, next).await }
        }))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

async fn run_stages(stages: &[Arc<dyn RequestStage>], mut request: Request, next: Next) -> Response {
    for stage in stages {
        if let Interception::ShortCircuit(response) = stage.intercept(&mut request) {
            return response;
        }
    }
    next.run(request).await
}
