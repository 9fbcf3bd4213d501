//! Health check response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Server health status.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Whether the server can serve requests.
    pub is_healthy: bool,
    /// Server version.
    pub version: String,
    /// When this status was produced.
    pub checked_at: Timestamp,
}
