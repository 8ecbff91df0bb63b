/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Errors render as
/// `{"error": "<code>", "message": "...", "details": [...]}` with the
/// matching status code; internal failures are logged and answered with a
/// generic message.
///
/// # Example
///
/// ```
/// use askboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Question not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use askboard_shared::auth::authorization::AuthzError;
use askboard_shared::auth::jwt::JwtError;
use askboard_shared::auth::password::PasswordError;
use askboard_shared::auth::session::AuthError;
use askboard_shared::db::errors::{constraint_violation, ConstraintViolation};
use askboard_shared::likes::{LikeError, LikeTarget};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by every handler
///
/// The variant picks the status code; the message is sent to the client
/// except for `InternalError`, whose text is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate email and other unique clashes
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Pool exhausted
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. "not_found"
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable code sent as `error`
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();

        let body = match self {
            ApiError::ValidationError(details) => ErrorResponse {
                error,
                message: "Request validation failed".to_string(),
                details: Some(details),
            },
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorResponse {
                    error,
                    message: "An internal error occurred".to_string(),
                    details: None,
                }
            }
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::ServiceUnavailable(message) => ErrorResponse {
                error,
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ConstraintViolation> for ApiError {
    fn from(violation: ConstraintViolation) -> Self {
        match (&violation, violation.constraint()) {
            (ConstraintViolation::Unique(_), Some("users_email_key")) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            (ConstraintViolation::Unique(_), _) => {
                ApiError::Conflict("Resource already exists".to_string())
            }
            // A valid token whose account has since been deleted
            (
                ConstraintViolation::ForeignKey(_),
                Some("questions_author_id_fkey" | "answers_author_id_fkey" | "likes_user_id_fkey"),
            ) => ApiError::Unauthorized("Account no longer exists".to_string()),
            (ConstraintViolation::ForeignKey(_), Some("answers_question_id_fkey")) => {
                ApiError::NotFound("Question not found".to_string())
            }
            // The tag was pruned between connect-or-create and linking
            (ConstraintViolation::ForeignKey(_), Some("question_tags_tag_id_fkey")) => {
                ApiError::Conflict("Tag was removed concurrently, retry the request".to_string())
            }
            (ConstraintViolation::ForeignKey(_), name) => {
                ApiError::InternalError(format!("Unexpected foreign key violation: {name:?}"))
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match constraint_violation(&err) {
            Some(violation) => violation.into(),
            None => match err {
                sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
                sqlx::Error::PoolTimedOut => {
                    ApiError::ServiceUnavailable("Database is busy, try again".to_string())
                }
                other => ApiError::InternalError(format!("Database error: {}", other)),
            },
        }
    }
}

fn target_label(target: &LikeTarget) -> &'static str {
    match target {
        LikeTarget::Question(_) => "Question",
        LikeTarget::Answer(_) => "Answer",
    }
}

impl From<LikeError> for ApiError {
    fn from(err: LikeError) -> Self {
        match err {
            LikeError::InvalidTarget(msg) => ApiError::invalid("target", msg),
            LikeError::AlreadyLiked(target) => {
                ApiError::BadRequest(format!("{} already liked", target_label(&target)))
            }
            LikeError::NotLiked(target) => {
                ApiError::NotFound(format!("{} not liked", target_label(&target)))
            }
            LikeError::TargetNotFound(target) => {
                ApiError::NotFound(format!("{} not found", target_label(&target)))
            }
            LikeError::UnknownUser(_) => ApiError::Unauthorized("Account no longer exists".to_string()),
            LikeError::Database(err) => err.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Authentication required".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::Expired => ApiError::Unauthorized("Session expired".to_string()),
            AuthError::InvalidToken(_) => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
