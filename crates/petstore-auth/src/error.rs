//! Authentication error types.

use petstore_core::error::PetstoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not activated")]
    AccountInactive,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PetstoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => PetstoreError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => PetstoreError::Crypto(msg),
        }
    }
}
