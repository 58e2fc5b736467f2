//! Stage controls: `POST /s/{id}/stage/{action}`.
//!
//! `action` is one of `advance`, `skip`, `restart` or `finale`.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::post;

use heartheist_core::stage::StageAction;

use crate::error::AppError;
use crate::state::AppState;

/// Build the stage control router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/s/{id}/stage/{action}", post(apply_action))
}

/// Move the session's cursor and send the visitor back to the host page.
async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let id = super::parse_id(&id)?;
    let action: StageAction = action.parse().map_err(AppError::BadRequest)?;

    let (from, to) = state
        .sessions
        .update(id, |session| {
            let from = session.cursor;
            session.cursor = action.apply(from);
            (from, session.cursor)
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("no session with id {id}")))?;

    tracing::info!(
        session = %id,
        ?action,
        from = %from.stage(),
        to = %to.stage(),
        "stage changed"
    );
    Ok(Redirect::to(&super::session_base(id)))
}
