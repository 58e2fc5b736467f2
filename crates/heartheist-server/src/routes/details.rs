//! Details form: `POST /s/{id}/details`.
//!
//! Multipart fields: `sender`, `recipient`, `accent`, `date` (`YYYY-MM-DD`),
//! `line`, `photo_a`, `photo_b`. Text fields that are absent leave the stored
//! value alone. A photo field with no file keeps the stored photo; a file with
//! an unsupported extension is dropped.

use std::sync::Arc;

use axum::Router;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::post;
use chrono::NaiveDate;

use heartheist_core::asset::{self, Photo, PhotoSlot};
use heartheist_core::session::{self, SessionInput};

use crate::error::AppError;
use crate::state::AppState;

/// Build the details router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/s/{id}/details", post(submit_details))
}

/// Everything one form submission changed.
#[derive(Debug, Default)]
struct DetailsForm {
    sender: Option<String>,
    recipient: Option<String>,
    accent: Option<String>,
    date: Option<NaiveDate>,
    line: Option<String>,
    photo_a: Option<Photo>,
    photo_b: Option<Photo>,
}

impl DetailsForm {
    fn apply(self, input: &mut SessionInput) {
        if let Some(sender) = self.sender {
            input.set_sender(&sender);
        }
        if let Some(recipient) = self.recipient {
            input.set_recipient(&recipient);
        }
        if let Some(accent) = self.accent {
            input.set_accent(&accent);
        }
        if let Some(date) = self.date {
            input.set_date(date);
        }
        if let Some(line) = self.line {
            input.set_line(&line);
        }
        if self.photo_a.is_some() {
            input.set_photo(PhotoSlot::A, self.photo_a);
        }
        if self.photo_b.is_some() {
            input.set_photo(PhotoSlot::B, self.photo_b);
        }
    }
}

/// Store the submitted details and send the visitor back to the host page.
async fn submit_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let id = super::parse_id(&id)?;
    let mut form = DetailsForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "sender" => form.sender = Some(text(field).await?),
            "recipient" => form.recipient = Some(text(field).await?),
            "accent" => form.accent = Some(text(field).await?),
            "line" => form.line = Some(text(field).await?),
            "date" => form.date = parse_date(&text(field).await?)?,
            "photo_a" => form.photo_a = photo(field, PhotoSlot::A).await?,
            "photo_b" => form.photo_b = photo(field, PhotoSlot::B).await?,
            other => tracing::debug!(field = %other, "ignoring unknown form field"),
        }
    }

    state
        .sessions
        .update(id, |session| form.apply(&mut session.input))
        .await
        .ok_or_else(|| AppError::NotFound(format!("no session with id {id}")))?;

    tracing::info!(session = %id, "details updated");
    Ok(Redirect::to(&super::session_base(id)))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Read an uploaded photo. Empty or unsupported uploads read as `None`.
async fn photo(field: Field<'_>, slot: PhotoSlot) -> Result<Option<Photo>, AppError> {
    let filename = field.file_name().unwrap_or_default().to_owned();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if filename.is_empty() || bytes.is_empty() {
        return Ok(None);
    }
    if !asset::is_supported_upload(&filename) {
        tracing::warn!(?slot, filename = %filename, "dropping unsupported upload");
        return Ok(None);
    }
    Ok(Some(Photo::new(filename, bytes.to_vec())))
}

/// Blank means "unchanged".
fn parse_date(value: &str) -> Result<Option<NaiveDate>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    session::parse_date(value)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
