//! JWT access token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use petstore_core::identity::{Authority, Identity};
use petstore_core::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject, the user ID (UUID string).
    pub sub: String,
    /// Login name of the subject.
    pub login: String,
    /// Granted authorities (`ROLE_*`).
    pub auth: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed EdDSA (Ed25519) JWT access token for `user`.
pub fn issue_access_token(user: &User, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        login: user.login.clone(),
        auth: user
            .authorities
            .iter()
            .map(|a| a.as_str().to_string())
            .collect(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_ed_pem(config.jwt_private_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad private key: {e}")))?;

    let header = Header::new(Algorithm::EdDSA);
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an EdDSA JWT access token.
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_ed_pem(config.jwt_public_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Validated JWT claims; a newtype proving the token was verified.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub AccessTokenClaims);

/// Validate a JWT access token (signature, expiry, issuer) and return
/// the verified claims. No database lookup is performed.
pub fn validate_access_token(token: &str, config: &AuthConfig) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

impl TryFrom<ValidatedClaims> for Identity {
    type Error = AuthError;

    /// Unknown authority names are dropped rather than rejected so that
    /// tokens minted with newer roles still identify their subject.
    fn try_from(ValidatedClaims(claims): ValidatedClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("subject is not a UUID: {e}")))?;
        Ok(Identity {
            user_id,
            login: claims.login,
            authorities: claims.auth.iter().filter_map(|a| Authority::parse(a)).collect(),
        })
    }
}
