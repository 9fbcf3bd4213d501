//! Image upload request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request payload for uploading an inline image.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Upload {
    /// Image as a `data:{media type};base64,...` URL.
    pub image: String,
}
