//! Pagination query parsing and response headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use petstore_core::pagination::{Page, PageRequest};
use serde::Deserialize;

pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");
pub const ALERT: HeaderName = HeaderName::from_static("x-petstoreapp-alert");
pub const ALERT_PARAMS: HeaderName = HeaderName::from_static("x-petstoreapp-params");

const APP_NAME: &str = "petstoreApp";

/// Raw `page`/`size`/`sort` query parameters.
///
/// Kept as strings so that junk values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::from_query(
            self.page.as_deref(),
            self.size.as_deref(),
            self.sort.as_deref(),
        )
    }
}

/// `X-Total-Count` plus an RFC 5988 `Link` header for `page`.
pub fn pagination_headers<T>(path: &str, page: &Page<T>, request: &PageRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT, HeaderValue::from(page.total));

    let sort = request.sort.to_query();
    let link = |number: u64, rel: &str| {
        format!(
            "<{path}?page={number}&size={}&sort={sort}>; rel=\"{rel}\"",
            page.size
        )
    };

    let last = page.last_page();
    let mut links = Vec::with_capacity(4);
    if page.page < last {
        links.push(link(page.page + 1, "next"));
    }
    if page.page > 0 {
        links.push(link(page.page - 1, "prev"));
    }
    links.push(link(last, "last"));
    links.push(link(0, "first"));

    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert(axum::http::header::LINK, value);
    }
    headers
}

/// Alert headers announcing an entity change, e.g.
/// `petstoreApp.Pet.created` with the entity id as parameter.
pub fn alert_headers(entity: &str, action: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("{APP_NAME}.{entity}.{action}")) {
        headers.insert(ALERT, value);
    }
    if let Ok(value) = HeaderValue::from_str(param) {
        headers.insert(ALERT_PARAMS, value);
    }
    headers
}
