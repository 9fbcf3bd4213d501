//! Request extractors that reject with [`Error`] instead of axum's plain-text rejections.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;
mod validated_json;

pub use self::enhanced_json::{Json, MAX_JSON_PAYLOAD_SIZE};
pub use self::enhanced_path::Path;
pub use self::validated_json::ValidateJson;
