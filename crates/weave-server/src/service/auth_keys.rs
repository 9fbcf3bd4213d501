//! Secret keys for bearer token verification.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};

use crate::service::{Result, ServiceError};

/// Signature algorithm used for bearer tokens.
pub const AUTH_ALGORITHM: Algorithm = Algorithm::HS256;
/// Issuer claim expected on bearer tokens.
pub const AUTH_ISSUER: &str = "weave";
/// Audience claim expected on bearer tokens.
pub const AUTH_AUDIENCE: &str = "weave:server";

/// Keys used to sign and verify bearer tokens.
///
/// This is a cheaply cloneable handle.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl AuthKeys {
    /// Creates keys from a shared HMAC secret.
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(ServiceError::config("Auth secret cannot be empty"));
        }

        let mut validation = Validation::new(AUTH_ALGORITHM);
        validation.set_issuer(&[AUTH_ISSUER]);
        validation.set_audience(&[AUTH_AUDIENCE]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "iat", "exp"]);

        let inner = AuthKeysInner {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
            validation,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the validation rules applied to incoming tokens.
    #[inline]
    pub fn validation(&self) -> &Validation {
        &self.inner.validation
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys")
            .field("algorithm", &AUTH_ALGORITHM)
            .finish_non_exhaustive()
    }
}
