//! Error types for weave-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message reported when an image-only request produced no image.
pub const IMAGE_GENERATION_FAILED: &str =
    "Image generation failed. Please check CLIPDROP_API_KEY configuration.";

/// Errors that can occur during generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, rate limited, etc.)
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// A provider credential is not configured.
    ///
    /// Reported before any provider call is attempted.
    #[error("{variable} is not configured. Please add it to your environment variables.")]
    MissingCredentials { variable: &'static str },

    /// The image provider returned no image for an image-only request.
    #[error("{}", IMAGE_GENERATION_FAILED)]
    ImageGeneration,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a missing credentials error for the given environment variable.
    pub fn missing_credentials(variable: &'static str) -> Self {
        Self::MissingCredentials { variable }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error was raised before any provider call.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingCredentials { .. } | Self::Config(_))
    }
}
