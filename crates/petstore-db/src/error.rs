//! Database-specific error types and conversions.

use petstore_core::error::PetstoreError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },
}

impl From<DbError> for PetstoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PetstoreError::NotFound { entity, id },
            DbError::Duplicate { entity } => PetstoreError::AlreadyExists { entity },
            DbError::Hash(msg) => PetstoreError::Crypto(msg),
            other => PetstoreError::Database(other.to_string()),
        }
    }
}
