//! HTTP routes.

mod account;
mod catalog;
pub mod crud;
mod pet;
mod store;
mod user;

use axum::Router;
use axum::middleware;

use crate::middleware::log_requests;
use crate::state::AppState;

/// The complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(account::router())
        .merge(catalog::router())
        .merge(pet::router())
        .merge(store::router())
        .merge(user::router())
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
