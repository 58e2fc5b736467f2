//! Host page routes.
//!
//! `/` starts a fresh session and redirects to it; `/s/{id}` serves the
//! host page with the details form, the stage controls and the scene frame.

use std::sync::{Arc, LazyLock};

use axum::Router;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::routing::get;

use heartheist_core::error::TemplateError;
use heartheist_core::stage::StageCursor;
use heartheist_core::template::{Context, Template};

use crate::error::AppError;
use crate::sessions::VisitorSession;
use crate::state::AppState;

static HOST_PAGE: LazyLock<Result<Template, TemplateError>> =
    LazyLock::new(|| Template::parse(include_str!("host.html")));

static FINALE_PANEL: LazyLock<Result<Template, TemplateError>> =
    LazyLock::new(|| Template::parse(include_str!("finale_panel.html")));

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(new_session))
        .route("/s/{id}", get(host_page))
}

/// Create a session and send the visitor to it.
async fn new_session(State(state): State<Arc<AppState>>) -> Redirect {
    let id = state.sessions.create().await;
    tracing::info!(session = %id, "new visitor session");
    Redirect::to(&super::session_base(id))
}

/// The host page for one session.
async fn host_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let session = super::load_session(&state, &id).await?;
    render_host(&session).map(Html)
}

fn render_host(session: &VisitorSession) -> Result<String, AppError> {
    let base = super::session_base(session.id);
    let input = &session.input;
    let cursor = session.cursor;

    let finale = if cursor.is_last() {
        let ctx = Context::new()
            .with("BASE", base.as_str())
            .with("PAGE_FILE", input.page_filename())
            .with("BUNDLE_FILE", input.bundle_filename())
            .with("ICS_FILE", input.ics_filename());
        render(&FINALE_PANEL, &ctx)?
    } else {
        String::new()
    };

    let ctx = Context::new()
        .with("BASE", base.as_str())
        .with("SENDER", input.sender())
        .with("RECIPIENT", input.recipient())
        .with("ACCENT", input.accent().as_str())
        .with("DATE", input.date().format("%Y-%m-%d").to_string())
        .with("LINE", input.line().unwrap_or_default())
        .with("STAGE_NUMBER", stage_number(cursor))
        .with("STAGE_TOTAL", count(StageCursor::total()))
        .with("STAGE_NAME", cursor.stage().as_str().to_uppercase())
        .with("FINALE", finale);
    render(&HOST_PAGE, &ctx)
}

fn render(template: &Result<Template, TemplateError>, ctx: &Context) -> Result<String, AppError> {
    template
        .as_ref()
        .map_err(|e| AppError::Internal(format!("host page template: {e}")))?
        .render(ctx)
        .map_err(|e| AppError::Internal(format!("host page template: {e}")))
}

/// One-based stage number for display.
fn stage_number(cursor: StageCursor) -> i64 {
    count(cursor.index() + 1)
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
