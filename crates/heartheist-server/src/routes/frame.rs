//! Scene frame: `GET /s/{id}/frame`.
//!
//! Serves the rendered HTML for the session's current stage. The host page
//! embeds it in an iframe.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;

/// Build the frame router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/s/{id}/frame", get(frame))
}

async fn frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let session = super::load_session(&state, &id).await?;
    let page = state
        .renderer
        .render(&session.input, session.cursor, &state.background, Utc::now())
        .await?;
    Ok(Html(page.html))
}
