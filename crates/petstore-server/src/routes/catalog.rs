//! `/category` and `/tag` resources.

use axum::Router;
use axum::routing::get;

use super::crud;
use crate::state::{AppState, CategoryRepo, TagRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/category",
            get(crud::list::<CategoryRepo>)
                .post(crud::create::<CategoryRepo>)
                .put(crud::update_from_body::<CategoryRepo>),
        )
        .route(
            "/category/:id",
            get(crud::get::<CategoryRepo>)
                .put(crud::update::<CategoryRepo>)
                .delete(crud::delete::<CategoryRepo>),
        )
        .route(
            "/tag",
            get(crud::list::<TagRepo>)
                .post(crud::create::<TagRepo>)
                .put(crud::update_from_body::<TagRepo>),
        )
        .route(
            "/tag/:id",
            get(crud::get::<TagRepo>)
                .put(crud::update::<TagRepo>)
                .delete(crud::delete::<TagRepo>),
        )
}
