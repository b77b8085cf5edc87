//! Router assembly.
//!
//! Builds the full service: API routes, the Static Asset Responder, request
//! tracing and Sentry layers, with trailing slashes trimmed before routing.

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::routes;
use crate::state::AppState;

/// Entry-point file served at `/`.
pub const INDEX_FILE: &str = "index.html";

/// Build the application service.
///
/// `/` returns `index.html` from the public directory, API routes come next,
/// and any other path falls back to a file lookup in the public directory.
pub fn build(state: AppState) -> NormalizePath<Router> {
    let public_dir = state.public_dir().to_path_buf();

    let router = Router::new()
        .route_service("/", ServeFile::new(public_dir.join(INDEX_FILE)))
        .merge(routes::routes())
        .fallback_service(ServeDir::new(&public_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
