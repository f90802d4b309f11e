//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the authentication service.
///
/// Key material is carried as PEM text; the server resolves it from the
/// configured key file paths before building this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    #[serde(skip)]
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    #[serde(skip)]
    pub jwt_public_key_pem: String,
    /// Path the private key is read from at startup.
    pub jwt_private_key_path: Option<String>,
    /// Path the public key is read from at startup.
    pub jwt_public_key_path: Option<String>,
    /// Access token lifetime in seconds (default: 86_400 = 1 day).
    pub access_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Create the `admin` and `user` accounts when the user table is empty.
    pub seed_default_users: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_private_key_path: None,
            jwt_public_key_path: None,
            access_token_lifetime_secs: 86_400,
            jwt_issuer: "petstore".into(),
            pepper: None,
            seed_default_users: true,
        }
    }
}

impl AuthConfig {
    /// `true` once both halves of the signing key pair are loaded.
    pub fn has_key_material(&self) -> bool {
        !self.jwt_private_key_pem.trim().is_empty() && !self.jwt_public_key_pem.trim().is_empty()
    }
}
