/// Like endpoints
///
/// Explicit like/unlike answer with an empty `204`; the toggles answer with
/// the resulting state and count.
///
/// | Route | Success | Already / not liked | Unknown target |
/// |-------|---------|---------------------|----------------|
/// | `POST   /v1/{questions,answers}/:id/like` | 204 | 400 | 404 |
/// | `DELETE /v1/{questions,answers}/:id/like` | 204 | 404 | 404 |
/// | `POST   /v1/{questions,answers}/:id/like/toggle` | 200 | n/a | 404 |
/// | `POST   /v1/likes/toggle` | 200 | n/a | 404 |
///
/// `POST /v1/likes/status` reports which of the given IDs the caller liked.
/// Every route requires authentication.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use askboard_shared::{
    auth::session::AuthContext,
    likes::{
        lookup::{bulk_like_status, LikedSet},
        toggle::{like, toggle_like, unlike},
        LikeOutcome, LikeTarget, TargetKind,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most IDs of one kind accepted by a status lookup
pub const MAX_STATUS_IDS: usize = 500;

/// Toggle with the target named in the body
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub question_id: Option<Uuid>,
    pub answer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub target_type: TargetKind,
    pub target_id: Uuid,
    pub liked: bool,
    pub like_count: i64,
}

impl From<LikeOutcome> for ToggleResponse {
    fn from(outcome: LikeOutcome) -> Self {
        Self {
            target_type: outcome.target.kind(),
            target_id: outcome.target.id(),
            liked: outcome.state.is_liked(),
            like_count: outcome.like_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub question_ids: Vec<Uuid>,

    #[serde(default)]
    pub answer_ids: Vec<Uuid>,
}

async fn toggle_target(state: &AppState, actor: &AuthContext, target: LikeTarget) -> ApiResult<Json<ToggleResponse>> {
    let outcome = toggle_like(state.likes.as_ref(), actor, target).await?;
    Ok(Json(outcome.into()))
}

async fn like_target(state: &AppState, actor: &AuthContext, target: LikeTarget) -> ApiResult<StatusCode> {
    like(state.likes.as_ref(), actor, target).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unlike_target(state: &AppState, actor: &AuthContext, target: LikeTarget) -> ApiResult<StatusCode> {
    unlike(state.likes.as_ref(), actor, target).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_question(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    like_target(&state, &actor, LikeTarget::Question(id)).await
}

pub async fn unlike_question(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    unlike_target(&state, &actor, LikeTarget::Question(id)).await
}

pub async fn like_answer(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    like_target(&state, &actor, LikeTarget::Answer(id)).await
}

pub async fn unlike_answer(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    unlike_target(&state, &actor, LikeTarget::Answer(id)).await
}

pub async fn toggle_question_like(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ToggleResponse>> {
    toggle_target(&state, &actor, LikeTarget::Question(id)).await
}

pub async fn toggle_answer_like(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ToggleResponse>> {
    toggle_target(&state, &actor, LikeTarget::Answer(id)).await
}

/// Toggles the like on whichever of `question_id` / `answer_id` is given
///
/// Naming neither or both is rejected before any storage access.
pub async fn toggle(
    State(state): State<AppState>,
    actor: AuthContext,
    Json(req): Json<ToggleRequest>,
) -> ApiResult<Json<ToggleResponse>> {
    let target = LikeTarget::from_parts(req.question_id, req.answer_id)?;
    toggle_target(&state, &actor, target).await
}

/// Which of the given questions and answers the caller has liked
pub async fn status(
    State(state): State<AppState>,
    actor: AuthContext,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<LikedSet>> {
    for (field, ids) in [("question_ids", &req.question_ids), ("answer_ids", &req.answer_ids)] {
        if ids.len() > MAX_STATUS_IDS {
            return Err(ApiError::invalid(
                field,
                format!("At most {} IDs per request", MAX_STATUS_IDS),
            ));
        }
    }

    let liked = bulk_like_status(state.likes.as_ref(), &actor, &req.question_ids, &req.answer_ids).await?;
    Ok(Json(liked))
}
