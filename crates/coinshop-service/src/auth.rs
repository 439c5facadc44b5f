//! Session tokens and the authentication extractor.
//!
//! - [`Authenticator`]: issue and verify opaque bearer tokens
//! - [`JwtAuthenticator`]: HS256 JWT implementation
//! - [`AuthUser`]: extractor for `Authorization: Bearer <token>`

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use coinshop_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Issues and verifies session tokens.
///
/// Handlers only rely on `issue`/`verify` semantics, never on the token
/// format.
pub trait Authenticator: Send + Sync {
    /// Issue a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the token cannot be signed.
    fn issue(&self, user: UserId) -> Result<String, ApiError>;

    /// Resolve a token to the user it was issued for.
    ///
    /// Returns `None` for malformed, forged or expired tokens.
    fn verify(&self, token: &str) -> Option<UserId>;
}

/// JWT claims carried by session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at.
    pub iat: i64,
    /// Expiration time.
    pub exp: i64,
}

/// HS256 JWT authenticator with a fixed token lifetime.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl JwtAuthenticator {
    /// Create an authenticator signing with `secret`.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let ttl_seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: chrono::Duration::try_seconds(ttl_seconds).unwrap_or(chrono::Duration::MAX),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }
}

impl Authenticator for JwtAuthenticator {
    fn issue(&self, user: UserId) -> Result<String, ApiError> {
        let now = chrono::Utc::now();
        let expires = now.checked_add_signed(self.ttl).unwrap_or(now);

        self.sign(&Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    fn verify(&self, token: &str) -> Option<UserId> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
            })
            .ok()?;

        data.claims.sub.parse().ok()
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user ID from the verified token.
    pub user_id: UserId,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let auth_header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            let user_id = state
                .authenticator
                .verify(token.trim())
                .ok_or(ApiError::Unauthorized)?;

            Ok(AuthUser { user_id })
        })
    }
}
