//! Vault backdrop image.
//!
//! The configured background URL is fetched once at startup and inlined as a
//! data URI. Any failure falls back to a generated solid-color PNG; the
//! visitor never sees an error.

use std::time::Duration;

use heartheist_core::asset;

/// Size of the generated fallback image.
const FALLBACK_SIZE: (u32, u32) = (64, 64);

/// Page background color (`#071024`).
const FALLBACK_RGB: [u8; 3] = [0x07, 0x10, 0x24];

/// Why the remote backdrop could not be used.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned {status}")]
    Status { status: u16 },

    #[error("response body is empty")]
    Empty,

    #[error("remote backgrounds are disabled in this build")]
    Disabled,
}

/// The generated solid-color backdrop.
#[must_use]
pub fn fallback() -> String {
    asset::blank_png_data_uri(FALLBACK_SIZE.0, FALLBACK_SIZE.1, FALLBACK_RGB)
}

/// Resolve the backdrop: the fetched image as a data URI, or the fallback.
pub async fn resolve(url: Option<&str>, timeout: Duration) -> String {
    let Some(url) = url else {
        return fallback();
    };
    match fetch(url, timeout).await {
        Ok(uri) => {
            tracing::info!(url = %url, "background image loaded");
            uri
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "background fetch failed, using blank image");
            fallback()
        }
    }
}

#[cfg(feature = "remote-background")]
async fn fetch(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Request(e.to_string()))?;

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(FetchError::Status {
            status: resp.status().as_u16(),
        });
    }

    let mime = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| v.starts_with("image/"))
        .map_or_else(|| asset::mime_for_filename(url).to_owned(), str::to_owned);

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;
    if bytes.is_empty() {
        return Err(FetchError::Empty);
    }

    Ok(asset::data_uri(&mime, &bytes))
}

#[cfg(not(feature = "remote-background"))]
async fn fetch(_url: &str, _timeout: Duration) -> Result<String, FetchError> {
    Err(FetchError::Disabled)
}
