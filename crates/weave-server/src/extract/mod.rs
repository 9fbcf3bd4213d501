//! Request extractors with structured rejections.
//!
//! ## Authentication
//!
//! - [`AuthHeader`] - bearer token extraction and verification
//! - [`AuthClaims`] - token claims carrying the owner identity
//! - [`AuthState`] - the authenticated owner
//!
//! ## Request data
//!
//! - [`Json`] - JSON bodies rejected with the standard error body
//! - [`ValidateJson`] - JSON bodies checked with `validator`
//! - [`Path`] - path parameters rejected with the standard error body

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthClaims, AuthHeader, AuthState};
pub use crate::extract::reject::{Json, MAX_JSON_PAYLOAD_SIZE, Path, ValidateJson};
