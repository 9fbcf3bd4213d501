//! JSON extractor with structured rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Maximum accepted JSON body size in bytes.
///
/// Sized for workflow documents and generation requests that carry several
/// inline images.
pub const MAX_JSON_PAYLOAD_SIZE: usize = 25 * 1024 * 1024;

/// JSON extractor and response wrapper.
///
/// Behaves like [`axum::Json`] but rejects with an [`Error`] that renders as
/// the standard error body.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        let detail = first_line(&rejection.body_text());
        let error = match rejection {
            JsonRejection::JsonDataError(_) => {
                ErrorKind::BadRequest.with_message("Request body does not match the expected shape")
            }
            JsonRejection::JsonSyntaxError(_) => {
                ErrorKind::BadRequest.with_message("Request body is not valid JSON")
            }
            JsonRejection::MissingJsonContentType(_) => {
                ErrorKind::BadRequest.with_message("Expected `Content-Type: application/json`")
            }
            JsonRejection::BytesRejection(ref err)
                if err.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                return ErrorKind::PayloadTooLarge
                    .with_message("Request body too large")
                    .with_context(format!("limit is {MAX_JSON_PAYLOAD_SIZE} bytes"));
            }
            JsonRejection::BytesRejection(_) => {
                ErrorKind::BadRequest.with_message("Request body could not be read")
            }
            _ => ErrorKind::InternalServerError.into_error(),
        };

        error.with_context(detail)
    }
}

/// Keeps the first line of a rejection, capped at 200 characters.
fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().chars().take(200).collect()
}

impl<T> aide::OperationInput for Json<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumJson::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_early_responses(ctx, operation)
    }
}

impl<T> aide::OperationOutput for Json<T>
where
    T: schemars::JsonSchema + Serialize,
{
    type Inner = T;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        AxumJson::<T>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_responses(ctx, operation)
    }
}
