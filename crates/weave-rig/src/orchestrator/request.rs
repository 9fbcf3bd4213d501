//! Generation request and result types.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// A generation request from a generator node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Text model identifier.
    pub model: String,
    /// Optional system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// The user prompt.
    pub user_prompt: String,
    /// Inline images attached as input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl GenerationRequest {
    /// Creates a request without system prompt or images.
    pub fn new(model: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            user_prompt: user_prompt.into(),
            images: Vec::new(),
        }
    }

    /// Sets the system prompt. Empty prompts are ignored.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        self.system_prompt = (!system_prompt.is_empty()).then_some(system_prompt);
        self
    }

    /// Attaches inline images.
    pub fn with_images(mut self, images: impl Into<Vec<String>>) -> Self {
        self.images = images.into();
        self
    }

    /// Returns the system and user prompt joined for classification.
    pub fn combined_prompt(&self) -> String {
        let system_prompt = self.system_prompt.as_deref().unwrap_or_default();
        format!("{system_prompt} {}", self.user_prompt)
            .trim()
            .to_owned()
    }
}

/// The result of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// The routed intent.
    pub intent: Intent,
    /// Text content, if any was produced.
    pub content: Option<String>,
    /// Generated image as an inline `data:` URL, if any.
    pub image: Option<String>,
}
