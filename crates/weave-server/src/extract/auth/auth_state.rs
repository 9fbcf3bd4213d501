//! Authenticated owner extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use uuid::Uuid;

use super::{AuthClaims, AuthHeader, TRACING_TARGET_AUTHENTICATION};
use crate::handler::Error;
use crate::service::AuthKeys;

/// The authenticated owner of the current request.
///
/// Handlers that touch workflows or images take this extractor; a request
/// without a valid bearer token is rejected with 401 before the handler runs.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Returns the owner identity.
    #[inline]
    #[must_use]
    pub fn owner_id(&self) -> Uuid {
        self.0.owner_id
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let auth_claims = auth_header.into_auth_claims();

        tracing::trace!(
            target: TRACING_TARGET_AUTHENTICATION,
            owner_id = %auth_claims.owner_id,
            "Request authenticated"
        );

        Ok(Self(auth_claims))
    }
}

impl aide::OperationInput for AuthState {}
