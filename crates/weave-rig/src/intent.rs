//! Intent classification for generation requests.
//!
//! A request is classified by a short, deterministic completion call against a
//! closed set of labels. Anything the classifier cannot answer cleanly is
//! treated as [`Intent::TextOnly`] so an unplanned image is never produced.
//! Explicit image phrases then upgrade a text-only answer to
//! [`Intent::ImageOnly`]; the override never produces [`Intent::Both`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::provider::{TextProvider, TextRequest};

/// Tracing target for intent classification.
pub const TRACING_TARGET: &str = "weave_rig::intent";

/// Default model for the classification call.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// Phrases that mark an explicit request for a new image.
pub const IMAGE_KEYWORDS: &[&str] = &[
    "new image",
    "generate image",
    "create image",
    "make image",
    "draw",
    "give me image",
    "give me a image",
    "another image",
    "new version",
    "generate a",
    "create a",
    "make a new",
];

const CLASSIFIER_INSTRUCTIONS: &str = r#"You are an intent classifier. Analyze the user's prompt and determine what type of output they need.

Reply with ONLY one of these exact words:
- "text_only" - for questions, explanations, analysis, writing tasks, descriptions
- "image_only" - for generating/creating/drawing NEW images
- "both" - when user wants BOTH text response AND a new image generated

Key indicators for IMAGE generation:
- "generate image", "create image", "draw", "make image", "give me image"
- "make it look", "modify this", "new version", "recreate", "redesign"
- "give me a new image", "new image", "another image", "different image"
- "make this more realistic", "stylize", "transform"

Examples:
- "What is this?" → text_only
- "Describe this image" → text_only
- "Generate an image of sunset" → image_only
- "Draw me a logo" → image_only
- "Make this image more realistic" → image_only
- "Give me a new image of this" → image_only
- "Make it look better and give me new image" → image_only
- "Explain this and create a new version" → both
- "Describe and illustrate the water cycle" → both"#;

/// The output shape a generation request should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Text answer only.
    TextOnly,
    /// A new image only.
    ImageOnly,
    /// A text answer and a new image.
    Both,
}

impl Intent {
    /// Parses a raw classifier reply, defaulting to [`Intent::TextOnly`].
    pub fn from_reply(reply: &str) -> Self {
        reply
            .trim()
            .to_lowercase()
            .parse()
            .unwrap_or(Self::TextOnly)
    }

    /// Returns true if this intent calls the text provider.
    pub const fn wants_text(self) -> bool {
        matches!(self, Self::TextOnly | Self::Both)
    }

    /// Returns true if this intent calls the image provider.
    pub const fn wants_image(self) -> bool {
        matches!(self, Self::ImageOnly | Self::Both)
    }
}

/// Returns true if the prompt contains an explicit image phrase.
pub fn mentions_image_request(prompt: &str) -> bool {
    let prompt = prompt.to_lowercase();
    IMAGE_KEYWORDS.iter().any(|keyword| prompt.contains(keyword))
}

/// Upgrades a text-only classification when the prompt explicitly asks for an image.
pub fn apply_keyword_override(prompt: &str, intent: Intent) -> Intent {
    if intent == Intent::TextOnly && mentions_image_request(prompt) {
        Intent::ImageOnly
    } else {
        intent
    }
}

/// Classifies prompts with a single completion call plus keyword override.
#[derive(Clone)]
pub struct IntentRouter {
    provider: Arc<dyn TextProvider>,
    model: String,
}

impl std::fmt::Debug for IntentRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRouter")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .finish()
    }
}

impl IntentRouter {
    /// Creates a router that classifies with the given provider and model.
    pub fn new(provider: Arc<dyn TextProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the classification model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classifies the combined system and user prompt.
    ///
    /// Never fails: a failed classification call is logged and treated as
    /// [`Intent::TextOnly`] before the keyword override is applied.
    pub async fn classify(&self, combined_prompt: &str) -> Intent {
        let request = TextRequest::new(&self.model, combined_prompt)
            .with_system_prompt(CLASSIFIER_INSTRUCTIONS)
            .with_max_tokens(10)
            .with_temperature(0.0);

        let classified = match self.provider.complete(request).await {
            Ok(reply) => Intent::from_reply(&reply),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Intent classification failed, defaulting to text"
                );
                Intent::TextOnly
            }
        };

        let intent = apply_keyword_override(combined_prompt, classified);

        tracing::debug!(
            target: TRACING_TARGET,
            classified = %classified,
            intent = %intent,
            "Classified prompt"
        );

        intent
    }
}
