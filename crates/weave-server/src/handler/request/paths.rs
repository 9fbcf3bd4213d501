//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use weave_runtime::workflow::WorkflowId;

/// Path parameters for single workflow operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPathParams {
    /// Unique identifier of the workflow.
    pub workflow_id: WorkflowId,
}

/// Path parameters for serving a stored image.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePathParams {
    /// Storage key returned by the upload endpoint, e.g. `{uuid}.png`.
    pub key: String,
}
