//! Generic CRUD handlers shared by every entity resource.
//!
//! Reads require `ROLE_USER`, writes `ROLE_ADMIN`. Each handler is
//! instantiated per repository type at routing time, e.g.
//! `get(crud::list::<CategoryRepo>)`, and finds its repository in the
//! application state through `FromRef`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, StatusCode};
use petstore_core::identity::Authority;
use petstore_core::models::Entity;
use petstore_core::repository::CrudRepository;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::pagination::{PageQuery, alert_headers, pagination_headers};

/// Update body that names its target in an `id` field.
#[derive(Debug, Deserialize)]
pub struct Identified<T> {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub changes: T,
}

pub async fn list<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<(HeaderMap, Json<Vec<R::Entity>>), ApiError>
where
    R: CrudRepository + 'static,
    R::Entity: Serialize,
{
    identity.require(Authority::User)?;

    let request = query.to_page_request();
    let page = repo.list(request.clone()).await?;
    let headers = pagination_headers(uri.path(), &page, &request);
    Ok((headers, Json(page.items)))
}

pub async fn get<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<R::Entity>, ApiError>
where
    R: CrudRepository + 'static,
    R::Entity: Serialize,
{
    identity.require(Authority::User)?;
    Ok(Json(repo.get_by_id(id).await?))
}

pub async fn create<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    ApiJson(input): ApiJson<R::Create>,
) -> Result<(StatusCode, HeaderMap, Json<R::Entity>), ApiError>
where
    R: CrudRepository + 'static,
    R::Entity: Serialize,
    R::Create: DeserializeOwned,
{
    identity.require(Authority::Admin)?;

    let created = repo.create(input, &identity.login).await?;
    let headers = alert_headers(R::Entity::NAME, "created", &created.id().to_string());
    Ok((StatusCode::CREATED, headers, Json(created)))
}

/// `PUT /<resource>` with the target id inside the body.
pub async fn update_from_body<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    ApiJson(body): ApiJson<Identified<R::Update>>,
) -> Result<(HeaderMap, Json<R::Entity>), ApiError>
where
    R: CrudRepository + 'static,
    R::Entity: Serialize,
    R::Update: DeserializeOwned,
{
    identity.require(Authority::Admin)?;

    let id = body.id.ok_or_else(|| ApiError::bad_request("Invalid id"))?;
    apply_update(&*repo, id, body.changes, &identity.login).await
}

/// `PUT /<resource>/:id` (and `POST /pet/:id`).
pub async fn update<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(changes): ApiJson<R::Update>,
) -> Result<(HeaderMap, Json<R::Entity>), ApiError>
where
    R: CrudRepository + 'static,
    R::Entity: Serialize,
    R::Update: DeserializeOwned,
{
    identity.require(Authority::Admin)?;
    apply_update(&*repo, id, changes, &identity.login).await
}

pub async fn delete<R>(
    State(repo): State<Arc<R>>,
    Authenticated(identity): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, HeaderMap), ApiError>
where
    R: CrudRepository + 'static,
{
    identity.require(Authority::Admin)?;

    repo.delete(id).await?;
    let headers = alert_headers(R::Entity::NAME, "deleted", &id.to_string());
    Ok((StatusCode::NO_CONTENT, headers))
}

async fn apply_update<R>(
    repo: &R,
    id: Uuid,
    changes: R::Update,
    actor: &str,
) -> Result<(HeaderMap, Json<R::Entity>), ApiError>
where
    R: CrudRepository,
{
    // Updates never create: a missing record is a client error.
    repo.get_by_id(id).await?;
    let updated = repo.update(id, changes, actor).await?;
    let headers = alert_headers(R::Entity::NAME, "updated", &id.to_string());
    Ok((headers, Json(updated)))
}
