/// Tag endpoints
///
/// - `GET  /v1/tags?limit=N` - most used tags
/// - `POST /v1/tags/cleanup` - delete tags no question uses (auth)

use crate::{app::AppState, error::ApiResult, routes::page_limit};
use askboard_shared::{
    auth::session::AuthContext,
    models::tag::{Tag, TagCount},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted_count: u64,
}

pub async fn popular_tags(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> ApiResult<Json<Vec<TagCount>>> {
    let tags = Tag::popular(&state.db, page_limit(query.limit, 10)).await?;
    Ok(Json(tags))
}

/// Sweeps orphaned tags left behind by earlier edits
pub async fn cleanup_tags(State(state): State<AppState>, actor: AuthContext) -> ApiResult<Json<CleanupResponse>> {
    let deleted_count = Tag::delete_all_orphans(&state.db).await?;

    info!(user_id = %actor.user_id, deleted_count, "Orphaned tags removed");
    Ok(Json(CleanupResponse { deleted_count }))
}
