/// Answer endpoints
///
/// - `GET    /v1/questions/:id/answers` - answers to a question
/// - `POST   /v1/questions/:id/answers` - answer a question (auth)
/// - `GET    /v1/answers/:id` - one answer
/// - `PATCH  /v1/answers/:id` - edit content (author)
/// - `DELETE /v1/answers/:id` - delete; its likes cascade (author)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use askboard_shared::{
    auth::{authorization::require_author, session::AuthContext},
    models::{
        answer::{Answer, AnswerView, CreateAnswer},
        question::Question,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

fn answer_not_found() -> ApiError {
    ApiError::NotFound("Answer not found".to_string())
}

async fn load_view(state: &AppState, id: Uuid) -> ApiResult<AnswerView> {
    Answer::view(&state.db, id).await?.ok_or_else(answer_not_found)
}

pub async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AnswerView>>> {
    if Question::find_by_id(&state.db, question_id).await?.is_none() {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    Ok(Json(Answer::list_for_question(&state.db, question_id).await?))
}

/// Adds an answer; a missing question is caught by the foreign key
pub async fn create_answer(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(question_id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let answer = Answer::create(
        &state.db,
        CreateAnswer {
            content: req.content,
            question_id,
            author_id: actor.user_id,
        },
    )
    .await?;

    info!(answer_id = %answer.id, question_id = %question_id, "Answer created");
    Ok((StatusCode::CREATED, Json(load_view(&state, answer.id).await?)))
}

pub async fn get_answer(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<AnswerView>> {
    Ok(Json(load_view(&state, id).await?))
}

pub async fn update_answer(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerView>> {
    req.validate()?;

    let existing = Answer::find_by_id(&state.db, id).await?.ok_or_else(answer_not_found)?;
    require_author(&actor, existing.author_id, "answer")?;

    Answer::update_content(&state.db, id, &req.content)
        .await?
        .ok_or_else(answer_not_found)?;

    Ok(Json(load_view(&state, id).await?))
}

pub async fn delete_answer(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = Answer::find_by_id(&state.db, id).await?.ok_or_else(answer_not_found)?;
    require_author(&actor, existing.author_id, "answer")?;

    if !Answer::delete(&state.db, id).await? {
        return Err(answer_not_found());
    }

    info!(answer_id = %id, user_id = %actor.user_id, "Answer deleted");
    Ok(StatusCode::NO_CONTENT)
}
