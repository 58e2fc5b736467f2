//! Asset encoder: turns uploaded photos and generated images into strings
//! that can sit directly in an HTML `src`/`href` attribute.
//!
//! Uploaded bytes are never inspected. A broken upload is passed through as a
//! data URI and only fails when the browser tries to draw it.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Extensions accepted by the upload form.
const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A 1x1 transparent PNG, used if generating a blank image ever fails.
const TRANSPARENT_PIXEL_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// An uploaded photo as received from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Client-supplied file name; only its extension is used.
    pub filename: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Build a photo from a file name and its bytes.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// The two photo slots on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    /// The sender's photo (the catcher in the rain scene).
    A,
    /// The recipient's photo (shown on the finale ticket).
    B,
}

impl PhotoSlot {
    /// Remote placeholder used when the slot has no upload.
    #[must_use]
    pub fn placeholder_url(self) -> &'static str {
        match self {
            Self::A => "https://via.placeholder.com/300x300.png?text=Me",
            Self::B => "https://via.placeholder.com/300x300.png?text=You",
        }
    }
}

/// MIME type for an uploaded image, inferred from its extension only.
///
/// `.jpg`/`.jpeg` (any case) map to `image/jpeg`; everything else is treated
/// as `image/png`.
#[must_use]
pub fn mime_for_filename(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "image/png",
    }
}

/// Whether the upload form accepts a file with this name.
#[must_use]
pub fn is_supported_upload(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Wrap bytes as a base64 `data:` URI with the given MIME type.
#[must_use]
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Encode the photo for a slot, or return the slot's placeholder URL.
///
/// Never returns an empty string. A zero-length upload counts as absent.
#[must_use]
pub fn encode_photo(slot: PhotoSlot, photo: Option<&Photo>) -> String {
    match photo {
        Some(photo) if !photo.bytes.is_empty() => {
            data_uri(mime_for_filename(&photo.filename), &photo.bytes)
        }
        _ => slot.placeholder_url().to_owned(),
    }
}

/// Render a solid-color PNG.
///
/// Zero dimensions are bumped to one pixel.
///
/// # Errors
///
/// Returns the `image` crate's error if PNG encoding fails.
pub fn blank_png(width: u32, height: u32, rgb: [u8; 3]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::RgbImage::from_pixel(width.max(1), height.max(1), image::Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// A solid-color PNG as a data URI; the background fallback.
#[must_use]
pub fn blank_png_data_uri(width: u32, height: u32, rgb: [u8; 3]) -> String {
    match blank_png(width, height, rgb) {
        Ok(bytes) => data_uri("image/png", &bytes),
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode blank placeholder image");
            TRANSPARENT_PIXEL_URI.to_owned()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_extensions_are_case_insensitive() {
        assert_eq!(mime_for_filename("me.jpg"), "image/jpeg");
        assert_eq!(mime_for_filename("me.JPEG"), "image/jpeg");
        assert_eq!(mime_for_filename("archive.tar.Jpg"), "image/jpeg");
    }

    #[test]
    fn everything_else_is_png() {
        assert_eq!(mime_for_filename("me.png"), "image/png");
        assert_eq!(mime_for_filename("me.gif"), "image/png");
        assert_eq!(mime_for_filename("noextension"), "image/png");
    }

    #[test]
    fn upload_filter_accepts_only_png_and_jpeg() {
        assert!(is_supported_upload("a.png"));
        assert!(is_supported_upload("b.JPG"));
        assert!(is_supported_upload("c.jpeg"));
        assert!(!is_supported_upload("d.gif"));
        assert!(!is_supported_upload("png"));
        assert!(!is_supported_upload("e.png.exe"));
    }

    #[test]
    fn photo_is_encoded_with_inferred_mime() {
        let photo = Photo::new("us.jpeg", vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            encode_photo(PhotoSlot::A, Some(&photo)),
            "data:image/jpeg;base64,/9j/"
        );
    }

    #[test]
    fn malformed_bytes_pass_through_unvalidated() {
        let photo = Photo::new("broken.png", b"not an image".to_vec());
        let uri = encode_photo(PhotoSlot::B, Some(&photo));
        assert_eq!(uri, "data:image/png;base64,bm90IGFuIGltYWdl");
    }

    #[test]
    fn missing_or_empty_photo_uses_slot_placeholder() {
        for slot in [PhotoSlot::A, PhotoSlot::B] {
            let absent = encode_photo(slot, None);
            assert!(!absent.is_empty());
            assert_eq!(absent, slot.placeholder_url());

            let empty = Photo::new("x.png", Vec::new());
            assert_eq!(encode_photo(slot, Some(&empty)), slot.placeholder_url());
        }
        assert_ne!(
            PhotoSlot::A.placeholder_url(),
            PhotoSlot::B.placeholder_url()
        );
    }

    #[test]
    fn blank_png_decodes_to_requested_color() {
        let bytes = blank_png(4, 3, [7, 16, 36]).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| p.0 == [7, 16, 36]));
    }

    #[test]
    fn blank_png_clamps_zero_dimensions() {
        let bytes = blank_png(0, 0, [0, 0, 0]).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn blank_png_data_uri_is_png() {
        assert!(blank_png_data_uri(2, 2, [255, 214, 224]).starts_with("data:image/png;base64,"));
    }
}
