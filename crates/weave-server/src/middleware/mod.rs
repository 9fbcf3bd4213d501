//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is exposed as an extension trait on [`Router`]:
//!
//! - [`RouterRecoveryExt`] - timeouts, panics and tower service errors
//! - [`RouterObservabilityExt`] - request ids, tracing spans, header redaction
//! - [`RouterSecurityExt`] - CORS, body limits and security headers
//! - [`RouterOpenApiExt`] - OpenAPI document and Scalar UI
//!
//! ```rust,no_run
//! use axum::Router;
//! use weave_server::middleware::{
//!     CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router<()> = Router::new()
//!     .with_recovery(&RecoveryConfig::default())
//!     .with_observability()
//!     .with_security(&CorsConfig::default());
//! ```
//!
//! [`Router`]: axum::Router

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
