/// Public user pages
///
/// - `GET /v1/users/:id` - profile with question and answer counts
/// - `GET /v1/users/:id/questions` - questions asked, paginated
/// - `GET /v1/users/:id/answers` - answers given, with question titles

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::questions::ListQuery,
};
use askboard_shared::models::{
    answer::{Answer, AnswerView},
    question::{Question, QuestionSummary},
    user::{User, UserProfile},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

async fn ensure_user(state: &AppState, id: Uuid) -> ApiResult<()> {
    match User::find_by_id(&state.db, id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<UserProfile>> {
    User::profile(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn user_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<QuestionSummary>>> {
    ensure_user(&state, id).await?;
    Ok(Json(Question::list(&state.db, query.into_filter(Some(id))).await?))
}

pub async fn user_answers(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<AnswerView>>> {
    ensure_user(&state, id).await?;
    Ok(Json(Answer::list_by_author(&state.db, id).await?))
}
