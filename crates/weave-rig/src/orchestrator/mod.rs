//! Generation orchestration.
//!
//! The [`Orchestrator`] routes a [`GenerationRequest`] through the intent
//! router and calls the text and image providers accordingly:
//!
//! | Intent | Text call | Image call |
//! |---|---|---|
//! | `text_only` | yes, with any images as vision input | no |
//! | `image_only` | no | yes, with the derived prompt |
//! | `both` | yes, with the image disclaimer clause | yes, with the derived prompt |
//!
//! An image-only request that produces no image fails as a whole. A request
//! for both runs the text call first and skips the image call if it fails; it
//! keeps its text when only the image call fails.

mod prompt;
mod request;

use std::sync::Arc;

pub use prompt::{
    DEFAULT_VISION_MODEL, REFUSAL_PHRASES, derive_image_prompt, failure_fallback, is_refusal,
    refusal_fallback,
};
pub use request::{GenerationOutput, GenerationRequest};

use crate::intent::{DEFAULT_CLASSIFIER_MODEL, Intent, IntentRouter};
use crate::provider::{ImageProvider, ProviderConfig, TextProvider, TextRequest};
use crate::{Error, Result};

/// Tracing target for orchestration.
pub const TRACING_TARGET: &str = "weave_rig::orchestrator";

/// Default upper bound on generated tokens for text and description calls.
pub const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Text content reported for a successful image-only request.
pub const IMAGE_ONLY_CONTENT: &str = "Image generated successfully!";

const IMAGE_DISCLAIMER_CLAUSE: &str = "\n\nCRITICAL INSTRUCTION: A separate AI system handles ALL \
    image generation and editing. You MUST NOT: 1) Say you cannot create/generate/edit/modify \
    images 2) Suggest using other software like Photoshop or GIMP 3) Apologize about image \
    capabilities. Just provide the text content requested and assume images are handled.";

/// Produces generation output for a request.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Runs a single generation request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput>;
}

/// Model selection for the orchestrator's auxiliary calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Model used for intent classification.
    pub classifier_model: String,
    /// Model used for the image description pre-pass.
    pub vision_model: String,
    /// Token limit for text and description calls.
    pub max_tokens: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_owned(),
            vision_model: DEFAULT_VISION_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

struct OrchestratorInner {
    text: Option<Arc<dyn TextProvider>>,
    image: Option<Arc<dyn ImageProvider>>,
    config: OrchestratorConfig,
}

/// Routes generation requests to the configured providers.
///
/// This is a cheaply cloneable handle.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("text", &self.inner.text.as_ref().map(|p| p.provider_name()))
            .field("image", &self.inner.image.is_some())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator from explicit providers.
    pub fn new(
        text: Option<Arc<dyn TextProvider>>,
        image: Option<Arc<dyn ImageProvider>>,
    ) -> Self {
        Self::with_config(text, image, OrchestratorConfig::default())
    }

    /// Creates an orchestrator with custom model selection.
    pub fn with_config(
        text: Option<Arc<dyn TextProvider>>,
        image: Option<Arc<dyn ImageProvider>>,
        config: OrchestratorConfig,
    ) -> Self {
        let inner = OrchestratorInner {
            text,
            image,
            config,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Creates an orchestrator from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured provider cannot be constructed.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self::new(config.text_provider()?, config.image_provider()?))
    }

    /// Returns the model selection.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    fn text_provider(&self) -> Result<&Arc<dyn TextProvider>> {
        self.inner
            .text
            .as_ref()
            .ok_or_else(|| Error::missing_credentials("OPENAI_API_KEY"))
    }

    async fn generate_text(
        &self,
        provider: &dyn TextProvider,
        request: &GenerationRequest,
        system_prompt: Option<String>,
    ) -> Result<String> {
        let mut text_request = TextRequest::new(&request.model, &request.user_prompt)
            .with_images(request.images.clone())
            .with_max_tokens(self.inner.config.max_tokens);
        if let Some(system_prompt) = system_prompt {
            text_request = text_request.with_system_prompt(system_prompt);
        }

        provider.complete(text_request).await
    }

    async fn generate_image(
        &self,
        provider: &dyn TextProvider,
        request: &GenerationRequest,
    ) -> Option<String> {
        let Some(image) = self.inner.image.as_ref() else {
            tracing::warn!(
                target: TRACING_TARGET,
                "Image provider is not configured"
            );
            return None;
        };

        let prompt = derive_image_prompt(
            provider,
            &self.inner.config.vision_model,
            &request.user_prompt,
            &request.images,
            self.inner.config.max_tokens,
        )
        .await;

        image.generate(&prompt).await
    }
}

#[async_trait::async_trait]
impl Generator for Orchestrator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput> {
        let text = self.text_provider()?.as_ref();

        let intent = IntentRouter::new(
            Arc::clone(self.text_provider()?),
            &self.inner.config.classifier_model,
        )
        .classify(&request.combined_prompt())
        .await;

        tracing::info!(
            target: TRACING_TARGET,
            model = %request.model,
            images = request.images.len(),
            intent = %intent,
            "Running generation"
        );

        match intent {
            Intent::TextOnly => {
                let content = self
                    .generate_text(text, &request, request.system_prompt.clone())
                    .await?;

                Ok(GenerationOutput {
                    intent,
                    content: Some(content),
                    image: None,
                })
            }
            Intent::ImageOnly => {
                let Some(image) = self.generate_image(text, &request).await else {
                    return Err(Error::ImageGeneration);
                };

                Ok(GenerationOutput {
                    intent,
                    content: Some(IMAGE_ONLY_CONTENT.to_owned()),
                    image: Some(image),
                })
            }
            Intent::Both => {
                let system_prompt = format!(
                    "{}{IMAGE_DISCLAIMER_CLAUSE}",
                    request.system_prompt.as_deref().unwrap_or_default()
                );

                let content = self
                    .generate_text(text, &request, Some(system_prompt))
                    .await?;
                let image = self.generate_image(text, &request).await;

                if image.is_none() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        "Image generation failed, returning text only"
                    );
                }

                Ok(GenerationOutput {
                    intent,
                    content: Some(content),
                    image,
                })
            }
        }
    }
}
