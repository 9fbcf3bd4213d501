//! Provider credentials and endpoints.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{ClipdropImageProvider, DEFAULT_CLIPDROP_ENDPOINT, ImageProvider, OpenAiTextProvider};
use super::{TRACING_TARGET, TextProvider};
use crate::Result;

/// Default timeout for provider HTTP requests: 60 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the text and image providers.
///
/// Missing API keys are not a startup error: requests that need the provider
/// fail with a precondition error instead.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ProviderConfig {
    /// OpenAI API key used for classification, vision and text generation.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_API_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Clipdrop API key used for image generation.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CLIPDROP_API_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub clipdrop_api_key: Option<String>,

    /// Clipdrop text-to-image endpoint.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CLIPDROP_ENDPOINT", default_value = DEFAULT_CLIPDROP_ENDPOINT)
    )]
    #[serde(default = "default_clipdrop_endpoint")]
    pub clipdrop_endpoint: String,

    /// Timeout in seconds for image provider requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PROVIDER_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub provider_timeout: u64,
}

fn default_clipdrop_endpoint() -> String {
    DEFAULT_CLIPDROP_ENDPOINT.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            clipdrop_api_key: None,
            clipdrop_endpoint: default_clipdrop_endpoint(),
            provider_timeout: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field(
                "clipdrop_api_key",
                &self.clipdrop_api_key.as_ref().map(|_| "***"),
            )
            .field("clipdrop_endpoint", &self.clipdrop_endpoint)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Sets the OpenAI API key.
    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    /// Sets the Clipdrop API key.
    pub fn with_clipdrop_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.clipdrop_api_key = Some(api_key.into());
        self
    }

    /// Returns the provider timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        if self.provider_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.provider_timeout)
        }
    }

    /// Creates the text provider, if an OpenAI key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenAI client cannot be built.
    pub fn text_provider(&self) -> Result<Option<Arc<dyn TextProvider>>> {
        let Some(api_key) = self.openai_api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        Ok(Some(Arc::new(OpenAiTextProvider::new(api_key)?)))
    }

    /// Creates the image provider, if a Clipdrop key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn image_provider(&self) -> Result<Option<Arc<dyn ImageProvider>>> {
        let Some(api_key) = self.clipdrop_api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let provider = ClipdropImageProvider::new(api_key, &self.clipdrop_endpoint, self.timeout())?;
        Ok(Some(Arc::new(provider)))
    }

    /// Logs which providers are configured, without exposing keys.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET,
            openai_configured = self.openai_api_key.is_some(),
            clipdrop_configured = self.clipdrop_api_key.is_some(),
            clipdrop_endpoint = %self.clipdrop_endpoint,
            timeout_secs = self.provider_timeout,
            "Provider configuration"
        );
    }
}
