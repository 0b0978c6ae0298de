//! Cache API endpoints
//!
//! Purges rendered widgets from the page cache, either by cache tag after
//! an entity changed or all at once.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};

/// Cache flush request
#[derive(Debug, Serialize, Deserialize)]
pub struct FlushCacheRequest {
    /// Cache tags such as `blog_post_42`
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/v1/cache/flush - Purge pages carrying any of the tags
pub async fn flush_cache(
    State(state): State<AppState>,
    Json(body): Json<FlushCacheRequest>,
) -> Result<StatusCode, ApiError> {
    if body.tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(ApiError::validation_error("Cache tags must not be empty"));
    }

    state.cache.flush_cache_by_tags(&body.tags).await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cache - Purge every cached page
pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.cache.clear().await;
    StatusCode::NO_CONTENT
}
