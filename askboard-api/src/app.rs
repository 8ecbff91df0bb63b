/// Application state, authentication extractor and router
///
/// # Example
///
/// ```no_run
/// use askboard_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use askboard_shared::auth::session::{authenticate, AuthContext};
use askboard_shared::likes::store::{LikeStore, PgLikeStore};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; the pool and the `Arc`s make that cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Storage behind the like operations
    pub likes: Arc<dyn LikeStore>,
}

impl AppState {
    /// Creates state backed by PostgreSQL for everything
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            likes: Arc::new(PgLikeStore::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }

    /// Replaces the like store
    pub fn with_like_store(mut self, likes: Arc<dyn LikeStore>) -> Self {
        self.likes = likes;
        self
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.config.auth.session_cookie_name
    }
}

/// Authenticated caller, from the bearer token or the session cookie
///
/// Rejects with 401 before the handler runs. Use `Option<AuthContext>` for
/// routes that only personalize their output.
#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(authenticate(
            &parts.headers,
            state.session_cookie_name(),
            state.jwt_secret(),
        )?)
    }
}

/// Builds the complete router with all routes and middleware
///
/// ```text
/// /health                              GET
/// /v1/auth/{register,login,refresh,logout}   POST
/// /v1/questions                        GET POST
/// /v1/questions/:id                    GET PATCH DELETE
/// /v1/questions/:id/answers            GET POST
/// /v1/questions/:id/like               POST DELETE
/// /v1/questions/:id/like/toggle        POST
/// /v1/answers/:id                      GET PATCH DELETE
/// /v1/answers/:id/like                 POST DELETE
/// /v1/answers/:id/like/toggle          POST
/// /v1/likes/toggle                     POST
/// /v1/likes/status                     POST
/// /v1/tags                             GET
/// /v1/tags/cleanup                     POST
/// /v1/users/:id[/questions|/answers]   GET
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout));

    let question_routes = Router::new()
        .route(
            "/",
            get(routes::questions::list_questions).post(routes::questions::create_question),
        )
        .route(
            "/:id",
            get(routes::questions::get_question)
                .patch(routes::questions::update_question)
                .delete(routes::questions::delete_question),
        )
        .route(
            "/:id/answers",
            get(routes::answers::list_answers).post(routes::answers::create_answer),
        )
        .route(
            "/:id/like",
            post(routes::likes::like_question).delete(routes::likes::unlike_question),
        )
        .route("/:id/like/toggle", post(routes::likes::toggle_question_like));

    let answer_routes = Router::new()
        .route(
            "/:id",
            get(routes::answers::get_answer)
                .patch(routes::answers::update_answer)
                .delete(routes::answers::delete_answer),
        )
        .route(
            "/:id/like",
            post(routes::likes::like_answer).delete(routes::likes::unlike_answer),
        )
        .route("/:id/like/toggle", post(routes::likes::toggle_answer_like));

    let like_routes = Router::new()
        .route("/toggle", post(routes::likes::toggle))
        .route("/status", post(routes::likes::status));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::popular_tags))
        .route("/cleanup", post(routes::tags::cleanup_tags));

    let user_routes = Router::new()
        .route("/:id", get(routes::users::get_user))
        .route("/:id/questions", get(routes::users::user_questions))
        .route("/:id/answers", get(routes::users::user_answers));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/questions", question_routes)
        .nest("/answers", answer_routes)
        .nest("/likes", like_routes)
        .nest("/tags", tag_routes)
        .nest("/users", user_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}
