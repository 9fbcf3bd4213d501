//! Object storage for images attached in the editor.
//!
//! Uploaded images are stored under `images/{uuid}.{ext}` and served back from
//! [`IMAGES_ROUTE`]. The extension carries the media type, so no metadata
//! support is needed from the storage backend.

use std::fmt;
use std::sync::Arc;

use opendal::Operator;
use strum::{AsRefStr, EnumString, IntoStaticStr};
use uuid::Uuid;
use weave_rig::provider::data_url::{self, InlineImage};
use weave_runtime::{WorkflowError, WorkflowResult};
use weave_runtime::session::ImageUploader;

use crate::service::{Result, ServiceError};

/// Tracing target for image storage.
pub const TRACING_TARGET: &str = "weave_server::service::images";

/// Route prefix that serves stored images.
pub const IMAGES_ROUTE: &str = "/images";

const IMAGES_DIR: &str = "images";

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    Png,
    #[strum(serialize = "jpg")]
    Jpeg,
    Gif,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Resolves the format from a media type such as `image/png`.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let format = match media_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::Webp,
            "image/svg+xml" => Self::Svg,
            _ => return None,
        };

        Some(format)
    }

    /// Returns the media type served for this format.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Returns the file extension used in storage keys.
    pub fn extension(self) -> &'static str {
        self.into()
    }
}

/// An image read back from storage.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Format derived from the storage key.
    pub format: ImageFormat,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Image storage backed by an [`Operator`].
#[derive(Clone)]
pub struct ImageStore {
    operator: Operator,
    public_base_url: Arc<str>,
}

impl ImageStore {
    /// Creates a store that writes through the given operator.
    pub fn new(operator: Operator, public_base_url: &str) -> Self {
        Self {
            operator,
            public_base_url: Arc::from(public_base_url.trim_end_matches('/')),
        }
    }

    /// Returns the durable reference for a storage key.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}{IMAGES_ROUTE}/{key}", self.public_base_url)
    }

    /// Stores a decoded inline image and returns its storage key.
    pub async fn put(&self, image: &InlineImage) -> Result<String> {
        let format = ImageFormat::from_media_type(&image.media_type).ok_or_else(|| {
            ServiceError::storage(format!("Unsupported image type: {}", image.media_type))
        })?;

        let key = format!("{}.{}", Uuid::now_v7(), format.extension());
        self.operator
            .write(&format!("{IMAGES_DIR}/{key}"), image.bytes.clone())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = image.bytes.len(),
            "Image stored"
        );

        Ok(key)
    }

    /// Reads an image by storage key.
    ///
    /// Keys that were not produced by [`ImageStore::put`] are reported as
    /// missing without touching storage.
    pub async fn get(&self, key: &str) -> Result<StoredImage> {
        let format = parse_key(key)
            .ok_or_else(|| ServiceError::not_found(format!("Unknown image key: {key}")))?;

        let bytes = self
            .operator
            .read(&format!("{IMAGES_DIR}/{key}"))
            .await?
            .to_vec();

        Ok(StoredImage { format, bytes })
    }
}

fn parse_key(key: &str) -> Option<ImageFormat> {
    let (stem, extension) = key.split_once('.')?;
    Uuid::parse_str(stem).ok()?;
    extension.parse().ok()
}

#[async_trait::async_trait]
impl ImageUploader for ImageStore {
    async fn upload(&self, inline: &str) -> WorkflowResult<String> {
        let image = data_url::decode(inline)
            .ok_or_else(|| WorkflowError::storage("Image is not an inline data URL"))?;

        let key = self.put(&image).await.map_err(WorkflowError::storage)?;
        Ok(self.url_for(&key))
    }
}

impl fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStore")
            .field("scheme", &self.operator.info().scheme())
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use opendal::services;

    use super::*;

    fn store() -> ImageStore {
        let operator = Operator::new(services::Memory::default())
            .map(|op| op.finish())
            .unwrap();
        ImageStore::new(operator, "https://weave.test/")
    }

    #[tokio::test]
    async fn put_then_get_preserves_bytes_and_format() {
        let store = store();
        let image = InlineImage {
            media_type: "image/jpeg".to_owned(),
            bytes: b"jpeg".to_vec(),
        };

        let key = store.put(&image).await.unwrap();
        assert!(key.ends_with(".jpg"));

        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.format, ImageFormat::Jpeg);
        assert_eq!(stored.bytes, b"jpeg");
    }

    #[tokio::test]
    async fn unsupported_media_type_is_rejected() {
        let image = InlineImage {
            media_type: "text/plain".to_owned(),
            bytes: b"hello".to_vec(),
        };

        assert!(store().put(&image).await.is_err());
    }

    #[tokio::test]
    async fn foreign_keys_are_not_found() {
        let store = store();
        for key in ["../secret.png", "cat.png", "0190a5d6-0000-7000-8000-000000000000.exe"] {
            let result = store.get(key).await;
            assert!(matches!(result, Err(ServiceError::NotFound { .. })), "{key}");
        }
    }

    #[tokio::test]
    async fn upload_returns_durable_reference() {
        let store = store();
        let inline = data_url::encode("image/png", b"png-bytes");

        let url = store.upload(&inline).await.unwrap();
        assert!(url.starts_with("https://weave.test/images/"));
        assert!(url.ends_with(".png"));

        let key = url.rsplit('/').next().unwrap();
        assert_eq!(store.get(key).await.unwrap().bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn upload_rejects_remote_urls() {
        let result = store().upload("https://example.com/cat.png").await;
        assert!(matches!(result, Err(WorkflowError::Storage(_))));
    }
}
