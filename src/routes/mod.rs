//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser host calls two JSON endpoints: the blueprint estimate (a
//! multipart upload) and the chat assistant. Both are thin adapters over
//! `crate::services`. CORS is open because the static front end is served
//! from a different origin.

pub mod chat;
pub mod estimate;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Headroom above the file limit for multipart boundaries and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES));

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/api/flooring-estimate", post(estimate::flooring_estimate).layer(upload_limit))
        .route("/api/chat", post(chat::chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "OK"
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
