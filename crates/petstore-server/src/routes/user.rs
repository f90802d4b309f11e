//! `/user` resource: account management for administrators.
//!
//! Users are addressed by login rather than by id. `POST /user` and the
//! bulk endpoints refuse existing logins, while `PUT /user` upserts.

use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use petstore_core::error::PetstoreError;
use petstore_core::identity::Authority;
use petstore_core::models::Entity;
use petstore_core::models::user::{CreateUser, UpdateUser, User};
use petstore_core::repository::{CrudRepository, UserRepository};
use serde::Deserialize;
use tracing::info;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::pagination::{PageQuery, alert_headers, pagination_headers};
use crate::state::{AppState, UserRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(list).post(create).put(upsert))
        .route("/user/createWithList", post(create_many))
        .route("/user/createWithArray", post(create_many))
        .route("/user/logout", post(logout))
        .route(
            "/user/:login",
            get(get_by_login).put(update_by_login).delete(delete_by_login),
        )
}

/// User payload accepted by the write endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub username: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub activated: Option<bool>,
    pub authorities: Option<Vec<Authority>>,
}

impl UserRequest {
    /// `username`, falling back to `login`; blank values count as absent.
    fn login(&self) -> Result<String, ApiError> {
        self.username
            .as_deref()
            .or(self.login.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Please specify username"))
    }

    /// New accounts default to an activated `ROLE_USER` whose password
    /// is its login.
    fn into_create(self, login: String) -> CreateUser {
        CreateUser {
            password: self.password.unwrap_or_else(|| login.clone()),
            login,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            activated: self.activated.unwrap_or(true),
            authorities: self.authorities.unwrap_or_else(|| vec![Authority::User]),
        }
    }

    fn into_update(self) -> UpdateUser {
        UpdateUser {
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            activated: self.activated,
            authorities: self.authorities,
        }
    }
}

/// The user with `login`, or `None` if there is none.
async fn find(users: &UserRepo, login: &str) -> Result<Option<User>, ApiError> {
    match users.get_by_login(login).await {
        Ok(user) => Ok(Some(user)),
        Err(PetstoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<(HeaderMap, Json<Vec<User>>), ApiError> {
    identity.require(Authority::Admin)?;

    let request = query.to_page_request();
    let page = users.list(request.clone()).await?;
    let headers = pagination_headers(uri.path(), &page, &request);
    Ok((headers, Json(page.items)))
}

async fn create(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(StatusCode, HeaderMap, Json<User>), ApiError> {
    identity.require(Authority::Admin)?;

    let login = body.login()?;
    if find(&users, &login).await?.is_some() {
        return Err(ApiError::bad_request(format!("The user {login} has existed")));
    }

    let created = users.create(body.into_create(login), &identity.login).await?;
    info!(login = %created.login, actor = %identity.login, "User created");
    let headers = alert_headers(User::NAME, "created", &created.login);
    Ok((StatusCode::CREATED, headers, Json(created)))
}

async fn create_many(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiJson(body): ApiJson<Vec<UserRequest>>,
) -> Result<(StatusCode, Json<Vec<User>>), ApiError> {
    identity.require(Authority::Admin)?;

    let logins = body
        .iter()
        .map(UserRequest::login)
        .collect::<Result<Vec<_>, _>>()?;
    let existing = users.find_by_logins(&logins).await?;
    if !existing.is_empty() {
        let names: Vec<&str> = existing.iter().map(|u| u.login.as_str()).collect();
        return Err(ApiError::bad_request(format!(
            "users: {} has existed",
            names.join(",")
        )));
    }

    let inputs = body
        .into_iter()
        .zip(logins)
        .map(|(request, login)| request.into_create(login))
        .collect();
    let created = users.create_many(inputs, &identity.login).await?;
    info!(count = created.len(), actor = %identity.login, "Users created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn upsert(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(HeaderMap, Json<User>), ApiError> {
    identity.require(Authority::Admin)?;

    let login = body.login()?;
    match find(&users, &login).await? {
        Some(existing) => {
            let updated = users
                .update(existing.id, body.into_update(), &identity.login)
                .await?;
            Ok((alert_headers(User::NAME, "updated", &login), Json(updated)))
        }
        None => {
            let mut body = body;
            // Upserted accounts always start with their login as password.
            body.password = None;
            let created = users.create(body.into_create(login.clone()), &identity.login).await?;
            info!(%login, actor = %identity.login, "User created by upsert");
            Ok((alert_headers(User::NAME, "created", &login), Json(created)))
        }
    }
}

async fn get_by_login(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiPath(login): ApiPath<String>,
) -> Result<Json<User>, ApiError> {
    identity.require(Authority::Admin)?;
    Ok(Json(users.get_by_login(&login).await?))
}

async fn update_by_login(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiPath(login): ApiPath<String>,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(HeaderMap, Json<User>), ApiError> {
    identity.require(Authority::Admin)?;

    let existing = find(&users, &login)
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("The user {login} not found")))?;
    let updated = users
        .update(existing.id, body.into_update(), &identity.login)
        .await?;
    Ok((alert_headers(User::NAME, "updated", &login), Json(updated)))
}

async fn delete_by_login(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
    ApiPath(login): ApiPath<String>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    identity.require(Authority::Admin)?;

    let existing = users.get_by_login(&login).await?;
    users.delete(existing.id).await?;
    info!(%login, actor = %identity.login, "User deleted");
    Ok((
        StatusCode::NO_CONTENT,
        alert_headers(User::NAME, "deleted", &login),
    ))
}

/// Tokens are stateless; logout only reports whether the caller's
/// account still exists.
async fn logout(
    State(users): State<Arc<UserRepo>>,
    Authenticated(identity): Authenticated,
) -> Result<Json<&'static str>, ApiError> {
    let outcome = match find(&users, &identity.login).await? {
        Some(_) => "success",
        None => "failed",
    };
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_wins_over_login() {
        let request = UserRequest {
            username: Some("alice".into()),
            login: Some("bob".into()),
            ..Default::default()
        };
        assert_eq!(request.login().unwrap(), "alice");
    }

    #[test]
    fn blank_username_is_rejected() {
        let request = UserRequest {
            username: Some("  ".into()),
            ..Default::default()
        };
        assert!(request.login().is_err());
    }

    #[test]
    fn create_defaults_password_to_login() {
        let input = UserRequest::default().into_create("carol".into());
        assert_eq!(input.password, "carol");
        assert!(input.activated);
        assert_eq!(input.authorities, vec![Authority::User]);
    }
}
