// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::digest::coordinator::NewsService;
use crate::envelope::NewsEnvelope;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");
const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/ping", get(ping))
        .route("/api/news", get(news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn ping() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        "ok/pong",
    )
        .into_response()
}

async fn news(State(state): State<AppState>) -> Response {
    let version = state.service.settings().version.clone();
    let (envelope, status) = Arc::clone(&state.service).guarded_digest().await;

    let body = match serde_json::to_vec(&envelope) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(target: "news", error = %e, "envelope serialization failed");
            serde_json::to_vec(&NewsEnvelope::failure(version)).unwrap_or_default()
        }
    };

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8)),
            (X_CACHE, HeaderValue::from_static(status.as_str())),
        ],
        body,
    )
        .into_response()
}
