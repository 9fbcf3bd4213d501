//! Text and image generation providers.
//!
//! Both providers are traits so the generation pipeline can be driven by
//! in-process fakes in tests:
//!
//! - [`TextProvider`]: chat completion with optional vision input, backed by
//!   [`OpenAiTextProvider`].
//! - [`ImageProvider`]: text-to-image generation, backed by
//!   [`ClipdropImageProvider`].

mod config;
pub mod data_url;
mod image;
mod text;

pub use config::ProviderConfig;
pub use image::{ClipdropImageProvider, DEFAULT_CLIPDROP_ENDPOINT, ImageProvider};
pub use text::{OpenAiTextProvider, TextProvider, TextRequest};

/// Tracing target for provider operations.
pub const TRACING_TARGET: &str = "weave_rig::provider";
