//! Image upload response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Durable reference to an uploaded image.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
    /// Always `true`; failures use the error body instead.
    pub success: bool,
    /// Public URL of the stored image.
    pub url: String,
}

impl Uploaded {
    /// Creates a successful upload response.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: url.into(),
        }
    }
}
