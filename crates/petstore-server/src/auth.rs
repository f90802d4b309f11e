//! Bearer token extraction.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use petstore_auth::{AuthConfig, AuthError, token};
use petstore_core::identity::Identity;

use crate::error::ApiError;

/// The caller behind a valid `Authorization: Bearer <jwt>` header.
///
/// Handlers that take this extractor reject anonymous requests with 401
/// before any of their own logic runs; role checks stay in the handler
/// via [`Identity::require`].
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    Arc<AuthConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AuthConfig>::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::TokenInvalid("missing bearer token".into()))?;
        let raw = bearer_token(header)
            .ok_or_else(|| AuthError::TokenInvalid("malformed authorization header".into()))?;

        let claims = token::validate_access_token(raw, &config)?;
        let identity = Identity::try_from(claims)?;

        Ok(Authenticated(identity))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
