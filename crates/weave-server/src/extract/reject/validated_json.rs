//! JSON extractor with `validator` checks.

use std::borrow::Cow;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Tracing target for request validation.
const TRACING_TARGET: &str = "weave_server::extract::validation";

/// JSON extractor that runs [`Validate`] after deserialization.
///
/// Validation failures reject with a 400 whose `details` list every message
/// ordered by field name and whose `message` joins them with `", "`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

/// Renders a single validation failure, preferring its custom message.
fn format_validation_error(field: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "required" => format!("Field '{}' is required", field),
        "length" => format!("Field '{}' has invalid length", field),
        "range" => format!("Field '{}' is out of valid range", field),
        "url" => format!("Field '{}' must be a valid URL", field),
        code => format!("Field '{}' failed validation: {}", field, code),
    }
}

/// Collects validation messages ordered by field name.
fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors
                .iter()
                .map(move |error| format_validation_error(&field, error))
        })
        .collect()
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let messages = collect_messages(&errors);

        tracing::warn!(
            target: TRACING_TARGET,
            errors = ?messages,
            "Request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            messages => messages.join(", "),
        };

        ErrorKind::ValidationError
            .with_message(message)
            .with_resource("request")
            .with_details(messages.into_iter().map(Cow::Owned))
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Default, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Zeta is required"))]
        zeta: String,
        #[validate(length(min = 1, message = "Alpha is required"))]
        alpha: String,
    }

    #[test]
    fn messages_are_ordered_by_field_and_joined() {
        let errors = Sample::default().validate().unwrap_err();
        let error = Error::from(errors);

        assert_eq!(error.kind(), ErrorKind::ValidationError);
        assert_eq!(error.message(), Some("Alpha is required, Zeta is required"));
        assert_eq!(error.details().len(), 2);
    }
}
