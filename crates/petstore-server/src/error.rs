//! HTTP error mapping.
//!
//! Every failure leaves the server as `{ "statusCode": <u16>, "message": <string> }`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use petstore_auth::AuthError;
use petstore_core::error::PetstoreError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

/// Error type returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Domain(PetstoreError),
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Domain(err) => match err {
                PetstoreError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
                // Lookups of missing records answer 400, as the public API always has.
                PetstoreError::NotFound { .. } | PetstoreError::AlreadyExists { .. } => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                PetstoreError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
                PetstoreError::AuthenticationFailed { .. } => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                PetstoreError::Forbidden { .. } => (StatusCode::FORBIDDEN, err.to_string()),
                PetstoreError::Database(_) | PetstoreError::Crypto(_) | PetstoreError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
                }
            },
        }
    }
}

impl From<PetstoreError> for ApiError {
    fn from(err: PetstoreError) -> Self {
        Self::Domain(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        }
        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PetstoreError) -> (StatusCode, String) {
        ApiError::from(err).status_and_message()
    }

    #[test]
    fn validation_messages_pass_through() {
        let (status, message) = status_of(PetstoreError::invalid("The pet was sold"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "The pet was sold");
    }

    #[test]
    fn not_found_is_bad_request() {
        let (status, _) = status_of(PetstoreError::not_found("pet", "42"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_failures_map_to_401_and_403() {
        let (status, _) = status_of(PetstoreError::AuthenticationFailed {
            reason: "invalid token".into(),
        });
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = status_of(PetstoreError::Forbidden {
            reason: "user requires ROLE_ADMIN".into(),
        });
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_details_are_hidden() {
        let (status, message) = status_of(PetstoreError::Database("connection reset".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("connection reset"));
    }
}
