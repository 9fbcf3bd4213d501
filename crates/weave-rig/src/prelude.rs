//! Prelude module for convenient imports.
//!
//! ```rust
//! use weave_rig::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::intent::{Intent, IntentRouter};
pub use crate::orchestrator::{GenerationOutput, GenerationRequest, Generator, Orchestrator};
pub use crate::provider::{ImageProvider, ProviderConfig, TextProvider, TextRequest};
