//! `/pet` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use petstore_core::identity::Authority;
use petstore_core::models::pet::{Pet, PetStatus};
use petstore_core::repository::PetRepository;
use serde::Deserialize;

use super::crud;
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::pagination::TOTAL_COUNT;
use crate::state::{AppState, PetRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/pet",
            get(crud::list::<PetRepo>)
                .post(crud::create::<PetRepo>)
                .put(crud::update_from_body::<PetRepo>),
        )
        .route("/pet/findByStatus", get(find_by_status))
        .route(
            "/pet/:id",
            get(crud::get::<PetRepo>)
                .post(crud::update::<PetRepo>)
                .delete(crud::delete::<PetRepo>),
        )
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

/// Parse `status` as sent by clients: `available`, `available,sold` or
/// `[available,sold]`.
fn parse_statuses(raw: &str) -> Result<Vec<PetStatus>, ApiError> {
    raw.trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<PetStatus>()
                .map_err(|_| ApiError::bad_request(format!("Invalid status value: {s}")))
        })
        .collect()
}

async fn find_by_status(
    State(pets): State<Arc<PetRepo>>,
    Authenticated(identity): Authenticated,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> Result<(HeaderMap, Json<Vec<Pet>>), ApiError> {
    identity.require(Authority::User)?;

    let statuses = parse_statuses(query.status.as_deref().unwrap_or_default())?;
    if statuses.is_empty() {
        return Err(ApiError::bad_request("Please specify at least one status"));
    }

    let (found, count) = pets.find_by_status(&statuses).await?;
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT, count.into());
    Ok((headers, Json(found)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_list_is_split() {
        let statuses = parse_statuses("[available,sold]").unwrap();
        assert_eq!(statuses, vec![PetStatus::Available, PetStatus::Sold]);
    }

    #[test]
    fn single_value_and_spaces() {
        assert_eq!(parse_statuses(" pending ").unwrap(), vec![PetStatus::Pending]);
        assert_eq!(
            parse_statuses("available, pending").unwrap(),
            vec![PetStatus::Available, PetStatus::Pending]
        );
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert!(parse_statuses("available,lost").is_err());
    }
}
