use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use opendal::{Operator, services};
use serde::{Deserialize, Serialize};

use crate::service::{AuthKeys, Result, ServiceError};

/// Default values for configuration options.
mod defaults {
    /// Default prefix for durable image references.
    pub const PUBLIC_BASE_URL: &str = "http://127.0.0.1:3000";

    pub fn public_base_url() -> String {
        PUBLIC_BASE_URL.to_owned()
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Shared secret used to verify HS256 bearer tokens.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "AUTH_SECRET", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub auth_secret: String,

    /// Filesystem root for uploaded images and workflow documents.
    ///
    /// Objects are kept in memory when absent.
    #[cfg_attr(feature = "config", arg(long, env = "STORAGE_ROOT"))]
    #[serde(default)]
    #[builder(default)]
    pub storage_root: Option<PathBuf>,

    /// Prefix used when building durable image references.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PUBLIC_BASE_URL", default_value = defaults::PUBLIC_BASE_URL)
    )]
    #[serde(default = "defaults::public_base_url")]
    #[builder(default = "defaults::public_base_url()")]
    pub public_base_url: String,
}

impl ServiceConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(secret) = &self.auth_secret
            && secret.trim().is_empty()
        {
            return Err("Auth secret cannot be empty".to_owned());
        }

        if let Some(url) = &self.public_base_url
            && url.trim().is_empty()
        {
            return Err("Public base URL cannot be empty".to_owned());
        }

        Ok(())
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validates values that bypass the builder (e.g. parsed from the command line).
    pub fn validate(&self) -> Result<()> {
        if self.auth_secret.trim().is_empty() {
            return Err(ServiceError::config("Auth secret cannot be empty"));
        }

        if self.public_base_url.trim().is_empty() {
            return Err(ServiceError::config("Public base URL cannot be empty"));
        }

        Ok(())
    }

    /// Loads the bearer token keys from the shared secret.
    pub fn load_auth_keys(&self) -> Result<AuthKeys> {
        AuthKeys::from_secret(self.auth_secret.as_bytes())
    }

    /// Connects to object storage: the filesystem when a root is configured,
    /// memory otherwise.
    pub fn connect_storage(&self) -> Result<Operator> {
        let operator = match &self.storage_root {
            Some(root) => {
                let root = root.to_str().ok_or_else(|| {
                    ServiceError::config("Storage root must be valid UTF-8")
                })?;

                let builder = services::Fs::default().root(root);
                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| ServiceError::config_with_source("Invalid storage root", e))?
            }
            None => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(|e| {
                    ServiceError::config_with_source("Failed to create memory storage", e)
                })?,
        };

        Ok(operator)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("auth_secret", &"***")
            .field("storage_root", &self.storage_root)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}
