//! Widget endpoint
//!
//! `GET /widgets/{action}` answers from the page cache when it can and
//! renders through the widget controller otherwise.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::Response,
};
use std::collections::HashMap;

use crate::api::{etag_matches, generate_etag, ApiError, AppState};
use crate::widgets::{WidgetAction, WidgetRequest};

/// Header reporting whether the page cache answered
pub const WIDGET_CACHE_HEADER: &str = "x-widget-cache";
/// Header listing the cache tags of the response
pub const CACHE_TAGS_HEADER: &str = "x-cache-tags";

/// GET /widgets/{action} - Render a widget
pub async fn get_widget(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let action: WidgetAction = action.parse().map_err(ApiError::not_found)?;
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    let cache_key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if let Some(page) = state.cache.get(&cache_key).await {
        tracing::debug!(key = %cache_key, "Widget cache hit");
        return widget_response(
            page.body.as_ref().clone(),
            &page.content_type,
            &page.etag,
            &page.tags,
            "hit",
            if_none_match,
        );
    }

    let request = WidgetRequest::from_query(&query);
    let rendered_since = state.cache.epoch();
    let rendered = state
        .controller
        .dispatch(action, &request)
        .await
        .map_err(|e| {
            tracing::error!("Failed to render {} widget: {:#}", action, e);
            ApiError::internal_error(format!("Failed to render widget: {}", action))
        })?;

    let etag = generate_etag(rendered.body.as_bytes());
    state
        .cache
        .store(
            &cache_key,
            rendered.body.clone(),
            rendered.content_type,
            etag.clone(),
            rendered.cache_tags.clone(),
            rendered_since,
        )
        .await;

    widget_response(
        rendered.body,
        rendered.content_type,
        &etag,
        &rendered.cache_tags,
        "miss",
        if_none_match,
    )
}

fn widget_response(
    body: String,
    content_type: &str,
    etag: &str,
    tags: &[String],
    cache_state: &str,
    if_none_match: Option<&str>,
) -> Result<Response, ApiError> {
    let builder = Response::builder()
        .header(header::ETAG, etag)
        .header(WIDGET_CACHE_HEADER, cache_state)
        .header(CACHE_TAGS_HEADER, tags.join(","));

    let response = if etag_matches(if_none_match, etag) {
        builder
            .status(StatusCode::NOT_MODIFIED)
            .body(Body::empty())
    } else {
        builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
    };

    response.map_err(|e| {
        tracing::error!("Failed to build widget response: {}", e);
        ApiError::internal_error("Failed to build widget response")
    })
}
