//! Partial updates to node payloads.
//!
//! A patch only touches the fields it sets. Nullable payload fields use
//! `Option<Option<_>>`: `Some(None)` clears the field.

use super::node::{GeneratorData, ImageData, NodeKind, TextData};

/// Partial update of a text node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPatch {
    pub label: Option<String>,
    pub content: Option<String>,
}

/// Partial update of an image node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePatch {
    pub label: Option<String>,
    pub image_url: Option<Option<String>>,
    pub image_base64: Option<Option<String>>,
}

/// Partial update of a generator node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorPatch {
    pub label: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub response: Option<Option<String>>,
    pub generated_image: Option<Option<String>>,
    pub is_loading: Option<bool>,
    pub error: Option<Option<String>>,
    pub image_input_count: Option<u8>,
}

impl GeneratorPatch {
    /// Marks a run as started: loading, with previous results cleared.
    pub fn run_started() -> Self {
        Self {
            is_loading: Some(true),
            error: Some(None),
            response: Some(None),
            generated_image: Some(None),
            ..Self::default()
        }
    }

    /// Stores the results of a finished run.
    pub fn run_succeeded(response: Option<String>, generated_image: Option<String>) -> Self {
        Self {
            is_loading: Some(false),
            response: Some(response),
            generated_image: Some(generated_image),
            ..Self::default()
        }
    }

    /// Stores the error of a failed run.
    pub fn run_failed(error: impl Into<String>) -> Self {
        Self {
            is_loading: Some(false),
            error: Some(Some(error.into())),
            ..Self::default()
        }
    }
}

/// A partial update for one node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePatch {
    Text(TextPatch),
    Image(ImagePatch),
    Generator(GeneratorPatch),
}

impl From<TextPatch> for NodePatch {
    fn from(patch: TextPatch) -> Self {
        Self::Text(patch)
    }
}

impl From<ImagePatch> for NodePatch {
    fn from(patch: ImagePatch) -> Self {
        Self::Image(patch)
    }
}

impl From<GeneratorPatch> for NodePatch {
    fn from(patch: GeneratorPatch) -> Self {
        Self::Generator(patch)
    }
}

fn merge<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

impl TextData {
    fn apply(&mut self, patch: TextPatch) {
        merge(&mut self.label, patch.label);
        merge(&mut self.content, patch.content);
    }
}

impl ImageData {
    fn apply(&mut self, patch: ImagePatch) {
        merge(&mut self.label, patch.label);
        merge(&mut self.image_url, patch.image_url);
        merge(&mut self.image_base64, patch.image_base64);
    }
}

impl GeneratorData {
    fn apply(&mut self, patch: GeneratorPatch) {
        merge(&mut self.label, patch.label);
        merge(&mut self.model, patch.model);
        merge(&mut self.system_prompt, patch.system_prompt);
        merge(&mut self.user_prompt, patch.user_prompt);
        merge(&mut self.response, patch.response);
        merge(&mut self.generated_image, patch.generated_image);
        merge(&mut self.is_loading, patch.is_loading);
        merge(&mut self.error, patch.error);
        merge(
            &mut self.image_input_count,
            patch.image_input_count.map(Self::clamp_image_inputs),
        );
    }
}

impl NodeKind {
    /// Shallow-merges a patch into the payload.
    ///
    /// Returns false, leaving the payload untouched, when the patch targets a
    /// different node kind.
    pub fn apply(&mut self, patch: NodePatch) -> bool {
        match (self, patch) {
            (Self::Text(data), NodePatch::Text(patch)) => data.apply(patch),
            (Self::Image(data), NodePatch::Image(patch)) => data.apply(patch),
            (Self::Generator(data), NodePatch::Generator(patch)) => data.apply(patch),
            _ => return false,
        }
        true
    }
}
