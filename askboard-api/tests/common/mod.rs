/// Shared setup for API integration tests
///
/// Tests build the full router over a real PostgreSQL database and drive it
/// with `oneshot`. Without DATABASE_URL the context is `None` and the test
/// returns early.

use askboard_api::app::{build_router, AppState};
use askboard_api::config::{ApiConfig, AuthConfig, Config, DatabaseConfig};
use askboard_shared::db::migrations::{ensure_database_exists, run_migrations};
use askboard_shared::db::pool::{self, create_pool};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

/// Registered account with its bearer header
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub bearer: String,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        ensure_database_exists(&url).await.expect("Failed to ensure database");

        let db = create_pool(pool::DatabaseConfig {
            url: url.clone(),
            max_connections: 10,
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");
        run_migrations(&db).await.expect("Migrations failed");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url,
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: SECRET.to_string(),
                session_cookie_name: "askboard_session".to_string(),
            },
        };

        let app = build_router(AppState::new(db.clone(), config));
        Some(Self { db, app })
    }

    pub async fn send(&self, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request and returns the status with the JSON body, if any
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(method, uri, bearer, body).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn register(&self, name: &str) -> TestUser {
        let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
        let password = "correct horse".to_string();

        let (status, body) = self
            .call(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(serde_json::json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        TestUser {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            password,
            bearer: format!("Bearer {}", body["access_token"].as_str().unwrap()),
        }
    }

    pub async fn ask(&self, user: &TestUser, title: &str, tags: &[&str]) -> Uuid {
        let (status, body) = self
            .call(
                Method::POST,
                "/v1/questions",
                Some(&user.bearer),
                Some(serde_json::json!({ "title": title, "content": "Details", "tags": tags })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "ask failed: {body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn answer(&self, user: &TestUser, question_id: Uuid, content: &str) -> Uuid {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/v1/questions/{question_id}/answers"),
                Some(&user.bearer),
                Some(serde_json::json!({ "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "answer failed: {body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub fn unique_tag(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12])
}
