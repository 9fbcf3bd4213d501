//! Image generation provider.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;

use super::{TRACING_TARGET, data_url};
use crate::{Error, Result};

/// Default Clipdrop text-to-image endpoint.
pub const DEFAULT_CLIPDROP_ENDPOINT: &str = "https://clipdrop-api.co/text-to-image/v1";

/// Text-to-image generation.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image for the prompt and returns it as an inline `data:` URL.
    ///
    /// Returns `None` on any non-success response or transport failure.
    async fn generate(&self, prompt: &str) -> Option<String>;
}

/// Inner client that holds the HTTP client and credentials.
struct ClipdropInner {
    http: Client,
    api_key: String,
    endpoint: String,
}

/// Clipdrop text-to-image provider.
#[derive(Clone)]
pub struct ClipdropImageProvider {
    inner: Arc<ClipdropInner>,
}

impl std::fmt::Debug for ClipdropImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipdropImageProvider")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl ClipdropImageProvider {
    /// Creates a new provider for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: &str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("weave/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            "Created clipdrop client"
        );

        let inner = ClipdropInner {
            http,
            api_key: api_key.to_owned(),
            endpoint: endpoint.to_owned(),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    async fn request(&self, prompt: &str) -> std::result::Result<String, String> {
        let form = Form::new().text("prompt", prompt.to_owned());

        let response = self
            .inner
            .http
            .post(&self.inner.endpoint)
            .header("x-api-key", &self.inner.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("status {status}: {body}"));
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or(data_url::DEFAULT_MEDIA_TYPE)
            .to_owned();

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(data_url::encode(&media_type, &bytes))
    }
}

#[async_trait::async_trait]
impl ImageProvider for ClipdropImageProvider {
    async fn generate(&self, prompt: &str) -> Option<String> {
        tracing::debug!(
            target: TRACING_TARGET,
            prompt_len = prompt.len(),
            "Requesting image generation"
        );

        match self.request(prompt).await {
            Ok(image) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    size = image.len(),
                    "Image generated"
                );
                Some(image)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Image generation failed"
                );
                None
            }
        }
    }
}
