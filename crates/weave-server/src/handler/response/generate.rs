//! Generation response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use weave_rig::intent::Intent;
use weave_rig::orchestrator::GenerationOutput;

/// Result of a generation request.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    /// Always `true`; failures use the error body instead.
    pub success: bool,
    /// The routed output shape: `text_only`, `image_only` or `both`.
    #[schemars(with = "String")]
    pub intent: Intent,
    /// Generated text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Generated image as an inline data URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<GenerationOutput> for Generated {
    fn from(output: GenerationOutput) -> Self {
        Self {
            success: true,
            intent: output.intent,
            content: output.content,
            image: output.image,
        }
    }
}
