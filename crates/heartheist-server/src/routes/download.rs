//! Downloads: `GET /s/{id}/download/{page|bundle|ics}`.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;

const HTML: &str = "text/html; charset=utf-8";
const CALENDAR: &str = "text/calendar; charset=utf-8";

/// Build the download router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/s/{id}/download/page", get(download_page))
        .route("/s/{id}/download/bundle", get(download_bundle))
        .route("/s/{id}/download/ics", get(download_ics))
}

/// The current stage as a standalone HTML file.
async fn download_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = super::load_session(&state, &id).await?;
    let page = state
        .renderer
        .render(&session.input, session.cursor, &state.background, Utc::now())
        .await?;
    Ok(attachment(&session.input.page_filename(), HTML, page.html))
}

/// All four stages in one self-contained HTML file.
async fn download_bundle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = super::load_session(&state, &id).await?;
    let html = state
        .renderer
        .render_bundle(&session.input, &state.background, Utc::now())
        .await?;
    Ok(attachment(&session.input.bundle_filename(), HTML, html))
}

/// The date-night calendar invite.
async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = super::load_session(&state, &id).await?;
    let invite = session.input.invite_at(Utc::now());
    Ok(attachment(&session.input.ics_filename(), CALENDAR, invite.text))
}

/// `filename` is already reduced to `[A-Za-z0-9_.-]`, so it needs no quoting.
fn attachment(filename: &str, content_type: &'static str, body: String) -> Response {
    tracing::debug!(filename = %filename, bytes = body.len(), "serving download");
    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
