//! Generation request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;
use weave_rig::orchestrator::GenerationRequest;

/// Request payload for a single generation.
///
/// Missing fields deserialize to empty values so that they are reported by
/// validation rather than as malformed JSON.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Generate {
    /// Text model identifier, e.g. `gpt-4o`.
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// User prompt.
    #[validate(length(min = 1, message = "User prompt is required"))]
    pub user_prompt: String,
    /// Input images as inline data URLs or durable references.
    pub images: Vec<String>,
}

impl Generate {
    /// Converts this request into a [`GenerationRequest`].
    pub fn into_request(self) -> GenerationRequest {
        let request = GenerationRequest::new(self.model, self.user_prompt).with_images(self.images);
        match self.system_prompt {
            Some(system_prompt) => request.with_system_prompt(system_prompt),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation() {
        let request: Generate = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("model"));
        assert!(fields.contains_key("user_prompt"));
    }

    #[test]
    fn converts_into_generation_request() {
        let request: Generate = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o",
            "systemPrompt": "be brief",
            "userPrompt": "describe this",
            "images": ["data:image/png;base64,AAAA"],
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        let request = request.into_request();
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.images.len(), 1);
    }
}
