//! Error types for the pet store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetstoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// A client-side validation failure; the message is shown to the caller verbatim.
    #[error("{0}")]
    InvalidRequest(String),

    /// A guarded write lost a race against a concurrent writer.
    #[error("Conflicting update on {entity} {id}")]
    Conflict { entity: String, id: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PetstoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type PetstoreResult<T> = Result<T, PetstoreError>;
