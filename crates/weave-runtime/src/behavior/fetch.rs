//! Fetching durable image references.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use weave_rig::provider::data_url;

use super::TRACING_TARGET;
use crate::{WorkflowError, WorkflowResult};

/// Default timeout for fetching a single image.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns a durable image reference into an inline `data:` URL.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches the image behind `url` and returns it inline.
    async fn fetch(&self, url: &str) -> WorkflowResult<String>;
}

/// [`ImageFetcher`] over HTTP.
#[derive(Clone)]
pub struct HttpImageFetcher {
    http: Arc<Client>,
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher").finish_non_exhaustive()
    }
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> WorkflowResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("weave/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WorkflowError::fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http: Arc::new(http),
        })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> WorkflowResult<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(WorkflowError::fetch)?;

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| value.starts_with("image/"))
            .unwrap_or(data_url::DEFAULT_MEDIA_TYPE)
            .to_owned();

        let bytes = response.bytes().await.map_err(WorkflowError::fetch)?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            media_type = %media_type,
            size = bytes.len(),
            "Fetched remote image"
        );

        Ok(data_url::encode(&media_type, &bytes))
    }
}
