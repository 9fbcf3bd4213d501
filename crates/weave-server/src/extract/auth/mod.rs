//! Bearer token authentication.
//!
//! - [`AuthClaims`] - token claims identifying the workflow owner
//! - [`AuthHeader`] - verified `Authorization: Bearer` header
//! - [`AuthState`] - the authenticated owner, required by private handlers

mod auth_claims;
mod auth_header;
mod auth_state;

pub use self::auth_claims::AuthClaims;
pub use self::auth_header::AuthHeader;
pub use self::auth_state::AuthState;

/// Tracing target for authentication.
pub const TRACING_TARGET_AUTHENTICATION: &str = "weave_server::extract::authentication";
