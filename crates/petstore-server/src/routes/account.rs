//! Login endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::post;
use axum::{Json, Router};
use petstore_auth::{LoginInput, LoginOutput};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, Auth};

pub fn router() -> Router<AppState> {
    Router::new().route("/authenticate", post(authenticate))
}

/// Exchange credentials for a JWT, returned both in the body and as an
/// `Authorization` header.
async fn authenticate(
    State(auth): State<Arc<Auth>>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<(HeaderMap, Json<LoginOutput>), ApiError> {
    let output = auth.authenticate(input).await?;

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", output.id_token)) {
        headers.insert(AUTHORIZATION, value);
    }
    Ok((headers, Json(output)))
}
