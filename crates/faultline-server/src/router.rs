//! Axum router wiring.
//!
//! `/` (any method) and every unmatched path go to the instrumented root
//! handler; `/metrics` and `/healthz` are served outside the instrumentation
//! chain.

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{any, get},
    BoxError, Router,
};
use tower::{
    limit::GlobalConcurrencyLimitLayer,
    load_shed::{error::Overloaded, LoadShedLayer},
    ServiceBuilder,
};
use tower_http::timeout::TimeoutLayer;

use crate::{app_state::AppState, handler, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let server = &state.cfg().server;

    let mut root = Router::new()
        .route("/", any(handler::root))
        .fallback(handler::root);

    // inside the chain so an expired request is recorded as 408
    if let Some(timeout) = server.request_timeout() {
        root = root.layer(TimeoutLayer::new(timeout));
    }

    // Shed instead of queueing: a request holding a permit may be waiting on
    // its own self-call, which must never wait for that permit.
    if let Some(max) = server.concurrency_limit() {
        root = root.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(shed_response))
                .layer(LoadShedLayer::new())
                .layer(GlobalConcurrencyLimitLayer::new(max)),
        );
    }

    root = obs::instrument(root, state.recorder());

    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .merge(root)
        .with_state(state)
}

async fn shed_response(err: BoxError) -> (StatusCode, String) {
    if err.is::<Overloaded>() {
        tracing::warn!("request shed: concurrency limit reached");
        (StatusCode::SERVICE_UNAVAILABLE, "overloaded\n".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("internal: {err}\n"))
    }
}
