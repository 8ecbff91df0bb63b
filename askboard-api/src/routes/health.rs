/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected",
///   "pool": { "size": 2, "idle": 1, "in_use": 1 } }
/// ```
///
/// A failing database check degrades the status but still answers 200, so
/// load balancers can tell a live process from a dead one.

use crate::{app::AppState, error::ApiResult};
use askboard_shared::db::pool::{get_pool_stats, health_check as db_health_check, PoolStats};
use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,

    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "Database health check failed");
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        pool: get_pool_stats(&state.db),
    }))
}
