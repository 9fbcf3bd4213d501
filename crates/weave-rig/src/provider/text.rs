//! Text generation provider.

use rig::completion::{AssistantContent, CompletionModel};
use rig::message::{Message, UserContent};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::openai;

use super::TRACING_TARGET;
use crate::{Error, Result};

/// A chat completion request with optional vision input.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// Model identifier, e.g. `gpt-4o`.
    pub model: String,
    /// Optional system prompt sent ahead of the user message.
    pub system_prompt: Option<String>,
    /// The user message text.
    pub user_prompt: String,
    /// Inline images sent as vision input before the text part.
    pub images: Vec<String>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u64>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

impl TextRequest {
    /// Creates a request for the given model and user prompt.
    pub fn new(model: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            user_prompt: user_prompt.into(),
            images: Vec::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Sets the system prompt. Empty prompts are ignored.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        self.system_prompt = (!system_prompt.is_empty()).then_some(system_prompt);
        self
    }

    /// Attaches inline images as vision input.
    pub fn with_images(mut self, images: impl Into<Vec<String>>) -> Self {
        self.images = images.into();
        self
    }

    /// Sets the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builds the user message: image parts first, then the text part.
    fn user_message(&self) -> Result<Message> {
        let mut parts: Vec<UserContent> = self
            .images
            .iter()
            .map(|image| UserContent::image_url(image.clone(), None, None))
            .collect();
        parts.push(UserContent::text(self.user_prompt.clone()));

        let content = OneOrMany::many(parts).map_err(|e| Error::provider(OPENAI, e))?;
        Ok(Message::User { content })
    }
}

/// Chat completion with optional vision input.
#[async_trait::async_trait]
pub trait TextProvider: Send + Sync {
    /// Returns the provider name used in errors and logs.
    fn provider_name(&self) -> &'static str;

    /// Sends a single completion request and returns the reply text.
    ///
    /// Transport and quota failures surface as [`Error::Provider`]; there is no
    /// automatic retry.
    async fn complete(&self, request: TextRequest) -> Result<String>;
}

const OPENAI: &str = "openai";

/// OpenAI chat completion provider built on `rig-core`.
///
/// The underlying client is built once and shared across requests.
#[derive(Clone, derive_more::Debug)]
pub struct OpenAiTextProvider {
    #[debug(skip)]
    client: openai::Client,
}

impl OpenAiTextProvider {
    /// Creates a provider authenticated with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenAI client cannot be built.
    pub fn new(api_key: &str) -> Result<Self> {
        let client: openai::Client =
            openai::Client::new(api_key).map_err(|e| Error::provider(OPENAI, e))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl TextProvider for OpenAiTextProvider {
    fn provider_name(&self) -> &'static str {
        OPENAI
    }

    async fn complete(&self, request: TextRequest) -> Result<String> {
        let model = self
            .client
            .clone()
            .completions_api()
            .completion_model(request.model.as_str());

        tracing::debug!(
            target: TRACING_TARGET,
            model = %request.model,
            images = request.images.len(),
            "Sending completion request"
        );

        let mut builder = model.completion_request(request.user_message()?);
        if let Some(system_prompt) = request.system_prompt {
            builder = builder.preamble(system_prompt);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                model = %request.model,
                error = %e,
                "Completion request failed"
            );
            Error::provider(OPENAI, e)
        })?;

        Ok(extract_text_content(&response.choice))
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}
