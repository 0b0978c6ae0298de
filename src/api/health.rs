//! Health endpoint

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub enabled: bool,
    pub entries: u64,
}

/// GET /api/v1/health - Database ping and cache size
///
/// Answers 503 with status `degraded` when the database does not respond.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.pool.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database ping failed: {:#}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_ok { "ok" } else { "error" },
        cache: CacheHealth {
            enabled: state.cache.is_enabled(),
            entries: state.cache.entry_count().await,
        },
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
