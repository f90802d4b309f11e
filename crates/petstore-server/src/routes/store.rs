//! `/store` resource: order placement, the order ledger and inventory.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use petstore_core::identity::Authority;
use petstore_core::models::Entity;
use petstore_core::models::order::Order;
use petstore_store::{Inventory, OrderRequest};

use super::crud;
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::pagination::alert_headers;
use crate::state::{AppState, OrderRepo, Store};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/store/order",
            post(place_order).put(crud::update_from_body::<OrderRepo>),
        )
        .route(
            "/store/order/:id",
            get(crud::get::<OrderRepo>)
                .put(crud::update::<OrderRepo>)
                .delete(crud::delete::<OrderRepo>),
        )
        .route("/store/orders", get(crud::list::<OrderRepo>))
        .route("/store/inventory", get(inventory))
}

async fn place_order(
    State(store): State<Arc<Store>>,
    Authenticated(identity): Authenticated,
    ApiJson(request): ApiJson<OrderRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Order>), ApiError> {
    identity.require(Authority::Admin)?;

    let order = store.place_order(request, &identity).await?;
    let headers = alert_headers(Order::NAME, "created", &order.id.to_string());
    Ok((StatusCode::CREATED, headers, Json(order)))
}

async fn inventory(
    State(store): State<Arc<Store>>,
    Authenticated(identity): Authenticated,
) -> Result<Json<Inventory>, ApiError> {
    identity.require(Authority::User)?;
    Ok(Json(store.inventory().await?))
}
