/// Authentication endpoints
///
/// - `POST /v1/auth/register` - create an account and get tokens
/// - `POST /v1/auth/login` - get tokens and a session cookie
/// - `POST /v1/auth/refresh` - exchange a refresh token for an access token
/// - `POST /v1/auth/logout` - clear the session cookie

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use askboard_shared::{
    auth::{jwt, password, session},
    models::user::{AuthorSummary, CreateUser, User},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Strips surrounding whitespace from the display name
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    pub password: String,
}

/// Tokens plus the user they belong to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AuthorSummary,

    #[serde(flatten)]
    pub tokens: jwt::TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn login_cookie(state: &AppState, access_token: &str) -> String {
    session::session_cookie(
        state.session_cookie_name(),
        access_token,
        jwt::TokenType::Access.lifetime().num_seconds(),
        state.config.api.production,
    )
}

/// Registers a new user
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.trimmed();
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: Some(req.name),
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let tokens = jwt::issue_token_pair(user.id, &user.email, state.jwt_secret())?;

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: AuthorSummary::from(&user),
            tokens,
        }),
    ))
}

/// Logs in with email and password
///
/// Returns the tokens in the body and sets the access token as an HttpOnly
/// session cookie.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let tokens = jwt::issue_token_pair(user.id, &user.email, state.jwt_secret())?;
    let cookie = login_cookie(&state, &tokens.access_token);

    info!(user_id = %user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: AuthorSummary::from(&user),
            tokens,
        }),
    ))
}

/// Exchanges a refresh token for a new access token
///
/// The session cookie is renewed alongside.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;
    let cookie = login_cookie(&state, &access_token);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(RefreshResponse {
            access_token,
            token_type: "Bearer",
            expires_in: jwt::TokenType::Access.lifetime().num_seconds(),
        }),
    ))
}

/// Clears the session cookie
///
/// Tokens are stateless, so an access token already handed to an API client
/// stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = session::clear_session_cookie(state.session_cookie_name(), state.config.api.production);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}
