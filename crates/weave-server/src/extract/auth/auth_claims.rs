use std::borrow::Cow;
use std::time::Duration;

use jiff::Timestamp;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Header, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::auth::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AUTH_ALGORITHM, AUTH_AUDIENCE, AUTH_ISSUER, AuthKeys};

/// Bearer token claims.
///
/// The subject is the owner identity every workflow operation is scoped to.
/// Timestamps are seconds since the Unix epoch, as RFC 7519 requires.
#[derive(Debug, Clone, Deserialize, Serialize, Hash, PartialEq, Eq)]
pub struct AuthClaims {
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,

    /// Subject (the owner of every workflow touched with this token).
    #[serde(rename = "sub")]
    pub owner_id: Uuid,
    /// Issued at.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl AuthClaims {
    /// Creates claims for `owner_id` valid for `lifetime` from now.
    pub fn new(owner_id: Uuid, lifetime: Duration) -> Self {
        let issued_at = Timestamp::now().as_second();
        let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

        Self {
            issued_by: Cow::Borrowed(AUTH_ISSUER),
            audience: Cow::Borrowed(AUTH_AUDIENCE),
            owner_id,
            issued_at,
            expires_at: issued_at.saturating_add(lifetime),
        }
    }

    /// Returns `true` if the token's expiration time has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now().as_second()
    }

    /// Signs the claims into a compact token.
    pub fn encode(&self, auth_keys: &AuthKeys) -> Result<String> {
        let header = Header::new(AUTH_ALGORITHM);
        encode(&header, self, auth_keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                owner_id = %self.owner_id,
                "Failed to encode bearer token"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_resource("authentication")
        })
    }

    /// Verifies a compact token and returns its claims.
    pub fn decode(token: &str, auth_keys: &AuthKeys) -> Result<Self> {
        let token_data = decode::<Self>(token, auth_keys.decoding_key(), auth_keys.validation())?;
        let claims = token_data.claims;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            owner_id = %claims.owner_id,
            expires_at = claims.expires_at,
            "Bearer token verified"
        );

        Ok(claims)
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            error = %error,
            "Bearer token rejected"
        );

        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Your session has expired")
                .with_context("Please sign in again to continue"),
            JwtErrorKind::InvalidToken => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is invalid")
                .with_context("The provided token format is unrecognized"),
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed")
                .with_context("Token signature could not be verified"),
            JwtErrorKind::InvalidAlgorithm => ErrorKind::MalformedAuthToken
                .with_message("Authentication token uses unsupported format")
                .with_context("Token was signed with an incompatible algorithm"),
            JwtErrorKind::InvalidAudience | JwtErrorKind::InvalidIssuer => {
                ErrorKind::Unauthorized
                    .with_message("Authentication token is not valid for this service")
                    .with_context("Token was issued for a different application")
            }
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is incomplete")
                .with_context(format!("Token is missing required field: {}", claim)),
            JwtErrorKind::Base64(_) | JwtErrorKind::Json(_) | JwtErrorKind::Utf8(_) => {
                ErrorKind::MalformedAuthToken
                    .with_message("Authentication token structure is invalid")
                    .with_context("Token payload contains malformed data")
            }
            _ => ErrorKind::InternalServerError
                .with_message("Authentication processing failed")
                .with_context("An unexpected error occurred during token validation"),
        };

        error.with_resource("authentication")
    }
}
