//! Application state and the services behind the handlers.

mod auth_keys;
mod config;
mod error;
mod image_store;
mod repository;
mod state;

pub use crate::service::auth_keys::{AUTH_ALGORITHM, AUTH_AUDIENCE, AUTH_ISSUER, AuthKeys};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, ServiceConfigBuilderError};
pub use crate::service::error::{Result, ServiceError};
pub use crate::service::image_store::{IMAGES_ROUTE, ImageFormat, ImageStore, StoredImage};
pub use crate::service::repository::{DocumentStore, WorkflowRepository, WorkflowUpdate};
pub use crate::service::state::ServiceState;
