//! Loomwear Storefront library.
//!
//! The public apparel shop: catalog pages, a session-held cart kept in step
//! with the backend cart, checkout, and shopper accounts. Exposed as a library
//! so the binary and the integration tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod notices;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header::CACHE_CONTROL},
    routing::get,
};
use tower_http::{
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Directory holding CSS, scripts and fingerprinted copies.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront router over the given session store.
///
/// Sentry layers are added by the binary; everything else lives here.
pub fn app<S: SessionStore + Clone>(state: AppState, store: S) -> Router {
    let session_layer = middleware::create_session_layer(store, state.config());

    let static_files = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=31536000, immutable"),
        ))
        .service(ServeDir::new(STATIC_DIR));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_files)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
