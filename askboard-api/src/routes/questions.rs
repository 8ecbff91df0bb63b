/// Question endpoints
///
/// - `GET    /v1/questions` - list, newest first, optional tag filter
/// - `POST   /v1/questions` - ask a question (auth)
/// - `GET    /v1/questions/:id` - question with answers and viewer like marks
/// - `PATCH  /v1/questions/:id` - edit title, content and tags (author)
/// - `DELETE /v1/questions/:id` - delete with cascade and tag cleanup (author)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::page_limit,
};
use askboard_shared::{
    auth::{authorization::require_author, session::AuthContext},
    likes::lookup::{bulk_like_status, LikedSet},
    models::{
        answer::{Answer, AnswerView},
        question::{CreateQuestion, ListQuestions, Question, QuestionSummary, UpdateQuestion},
        tag::{normalize_tag_names, MAX_TAGS_PER_QUESTION},
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for listing questions
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn into_filter(self, author_id: Option<Uuid>) -> ListQuestions {
        ListQuestions {
            tag: self
                .tag
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            author_id,
            limit: page_limit(self.limit, 20),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 2, max = 100, message = "Title must be between 2 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be between 1 and 10000 characters"))]
    pub content: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 2, max = 100, message = "Title must be between 2 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be between 1 and 10000 characters"))]
    pub content: String,

    pub tags: Vec<String>,
}

/// Answer as shown on a question page
#[derive(Debug, Serialize)]
pub struct AnswerItem {
    #[serde(flatten)]
    pub answer: AnswerView,
    pub liked_by_viewer: bool,
}

/// Question page: the question, its answers and the viewer's like marks
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: QuestionSummary,
    pub liked_by_viewer: bool,
    pub answers: Vec<AnswerItem>,
}

/// Normalizes tags and enforces the per-question bounds
fn checked_tags(raw: &[String], min: usize) -> ApiResult<Vec<String>> {
    let tags = normalize_tag_names(raw).map_err(|msg| ApiError::invalid("tags", msg))?;

    if tags.len() > MAX_TAGS_PER_QUESTION {
        return Err(ApiError::invalid(
            "tags",
            format!("At most {} tags are allowed", MAX_TAGS_PER_QUESTION),
        ));
    }
    if tags.len() < min {
        return Err(ApiError::invalid("tags", "At least one tag is required"));
    }

    Ok(tags)
}

fn question_not_found() -> ApiError {
    ApiError::NotFound("Question not found".to_string())
}

async fn load_summary(state: &AppState, id: Uuid) -> ApiResult<QuestionSummary> {
    Question::summary(&state.db, id)
        .await?
        .ok_or_else(question_not_found)
}

pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<QuestionSummary>>> {
    let questions = Question::list(&state.db, query.into_filter(None)).await?;
    Ok(Json(questions))
}

/// Creates a question with its tags in one transaction
pub async fn create_question(
    State(state): State<AppState>,
    actor: AuthContext,
    Json(req): Json<CreateQuestionRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let tags = checked_tags(&req.tags, 0)?;

    let question = Question::create_with_tags(
        &state.db,
        CreateQuestion {
            title: req.title,
            content: req.content,
            author_id: actor.user_id,
            tags,
        },
    )
    .await?;

    let summary = load_summary(&state, question.id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Shows a question with its answers
///
/// For a signed-in viewer one bulk lookup marks which of the question and
/// answers they liked; anonymous viewers see no marks.
pub async fn get_question(
    State(state): State<AppState>,
    viewer: Option<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuestionDetail>> {
    let question = load_summary(&state, id).await?;
    let answers = Answer::list_for_question(&state.db, id).await?;

    let liked = match &viewer {
        Some(viewer) => {
            let answer_ids: Vec<Uuid> = answers.iter().map(|a| a.id).collect();
            bulk_like_status(state.likes.as_ref(), viewer, &[id], &answer_ids).await?
        }
        None => LikedSet::default(),
    };

    Ok(Json(QuestionDetail {
        liked_by_viewer: liked.question_liked(&question.id),
        question,
        answers: answers
            .into_iter()
            .map(|answer| AnswerItem {
                liked_by_viewer: liked.answer_liked(&answer.id),
                answer,
            })
            .collect(),
    }))
}

/// Replaces title, content and tags; only the author may edit
pub async fn update_question(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> ApiResult<Json<QuestionSummary>> {
    req.validate()?;
    let tags = checked_tags(&req.tags, 1)?;

    let existing = Question::find_by_id(&state.db, id)
        .await?
        .ok_or_else(question_not_found)?;
    require_author(&actor, existing.author_id, "question")?;

    Question::update_with_tags(
        &state.db,
        id,
        UpdateQuestion {
            title: req.title,
            content: req.content,
            tags,
        },
    )
    .await?
    .ok_or_else(question_not_found)?;

    Ok(Json(load_summary(&state, id).await?))
}

/// Deletes a question; answers, likes and tag links cascade
pub async fn delete_question(
    State(state): State<AppState>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = Question::find_by_id(&state.db, id)
        .await?
        .ok_or_else(question_not_found)?;
    require_author(&actor, existing.author_id, "question")?;

    let pruned = Question::delete_with_cleanup(&state.db, id)
        .await?
        .ok_or_else(question_not_found)?;

    info!(question_id = %id, user_id = %actor.user_id, pruned_tags = pruned, "Question removed");
    Ok(StatusCode::NO_CONTENT)
}
