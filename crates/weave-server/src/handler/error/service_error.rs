//! Conversions from service, workflow and generation errors into HTTP errors.

use weave_runtime::WorkflowError;

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::ServiceError;

/// Tracing target for error conversions.
const TRACING_TARGET: &str = "weave_server::handler::errors";

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound { message } => {
                tracing::debug!(target: TRACING_TARGET, %message, "Resource not found");
                ErrorKind::NotFound.with_message(message)
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "Service operation failed");
                ErrorKind::InternalServerError
                    .with_message("Internal error")
                    .with_context(other.to_string())
            }
        }
    }
}

impl From<weave_rig::Error> for HttpError<'static> {
    fn from(error: weave_rig::Error) -> Self {
        if error.is_precondition() {
            tracing::warn!(target: TRACING_TARGET, error = %error, "Generation is not configured");
        } else {
            tracing::error!(target: TRACING_TARGET, error = %error, "Generation failed");
        }

        ErrorKind::InternalServerError
            .with_message(error.to_string())
            .with_resource("generation")
    }
}

impl From<WorkflowError> for HttpError<'static> {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::Generation(error) => error.into(),
            WorkflowError::NodeNotFound(_) | WorkflowError::NotLoaded => {
                ErrorKind::NotFound.with_message(error.to_string())
            }
            WorkflowError::InvalidNode { .. } | WorkflowError::Serialization(_) => {
                ErrorKind::BadRequest.with_message(error.to_string())
            }
            WorkflowError::Storage(_) | WorkflowError::Fetch(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "Workflow operation failed");
                ErrorKind::InternalServerError
                    .with_message("Internal error")
                    .with_context(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_not_found_maps_to_404() {
        let error: HttpError = ServiceError::not_found("Image not found").into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), Some("Image not found"));
    }

    #[test]
    fn storage_failures_hide_details() {
        let error: HttpError = ServiceError::storage("disk full").into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), Some("Internal error"));
        assert!(error.context().is_some_and(|c| c.contains("disk full")));
    }

    #[test]
    fn generation_errors_surface_their_message() {
        let error: HttpError = weave_rig::Error::missing_credentials("OPENAI_API_KEY").into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(error.message().is_some_and(|m| m.starts_with("OPENAI_API_KEY")));
    }
}
