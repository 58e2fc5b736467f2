//! HTTP routes.
//!
//! Every visitor route lives under `/s/{id}`; the id is the session UUID.

pub mod details;
pub mod download;
pub mod frame;
pub mod health;
pub mod stage;
pub mod ui;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::AppError;
use crate::sessions::VisitorSession;
use crate::state::AppState;

/// Concurrent form uploads allowed at once.
const UPLOAD_CONCURRENCY: usize = 16;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    // Uploads carry photos; cap their size and how many run at once.
    let upload_routes = details::router()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(tower::limit::ConcurrencyLimitLayer::new(UPLOAD_CONCURRENCY));

    Router::new()
        .merge(ui::router())
        .merge(upload_routes)
        .merge(stage::router())
        .merge(frame::router())
        .merge(download::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Path prefix for a session's routes.
pub(crate) fn session_base(id: Uuid) -> String {
    format!("/s/{id}")
}

/// Look up a session by its path segment, marking it as seen.
pub(crate) async fn load_session(state: &AppState, id: &str) -> Result<VisitorSession, AppError> {
    let id = parse_id(id)?;
    state
        .sessions
        .touch(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("no session with id {id}")))
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(format!("no session with id {id}")))
}
