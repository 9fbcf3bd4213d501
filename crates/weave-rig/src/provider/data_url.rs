//! Inline image encoding.
//!
//! Inline images travel as `data:` URLs (`data:image/png;base64,....`), which
//! both the OpenAI vision input and the editor accept directly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Media type assumed when a response carries no usable content type.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Encodes raw bytes into a base64 `data:` URL.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Decoded contents of a base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Media type declared in the URL header.
    pub media_type: String,
    /// Decoded payload bytes.
    pub bytes: Vec<u8>,
}

/// Decodes a base64 `data:` URL.
///
/// Returns `None` for anything that is not a well-formed base64 data URL.
pub fn decode(value: &str) -> Option<InlineImage> {
    let rest = value.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;

    let media_type = if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_owned()
    } else {
        media_type.to_owned()
    };

    Some(InlineImage { media_type, bytes })
}

/// Returns true if the value is an inline `data:` URL.
pub fn is_inline(value: &str) -> bool {
    value.starts_with("data:")
}
