//! Stored image response types.

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::service::{ImageFormat, StoredImage};

/// Cache policy for stored images. Keys are never reused.
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Raw image bytes served with their media type.
#[must_use]
#[derive(Debug, Clone)]
pub struct ImageContent {
    /// Format used for the `Content-Type` header.
    pub format: ImageFormat,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl From<StoredImage> for ImageContent {
    fn from(image: StoredImage) -> Self {
        Self {
            format: image.format,
            bytes: image.bytes,
        }
    }
}

impl IntoResponse for ImageContent {
    fn into_response(self) -> Response {
        let headers = [
            (header::CONTENT_TYPE, self.format.media_type()),
            (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL),
        ];

        (headers, self.bytes).into_response()
    }
}

impl aide::OperationOutput for ImageContent {
    type Inner = Self;
}
