/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Emails are normalized to lowercase before they reach the table, so the
/// plain unique constraint behaves case-insensitively.
///
/// # Example
///
/// ```no_run
/// use askboard_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: Some("Jane Doe".to_string()),
///     email: "Jane@Example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
///
/// assert_eq!(user.email, "jane@example.com");
/// let found = User::find_by_email(&pool, "JANE@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A registered account
///
/// Users are immutable after signup apart from the timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Optional display name
    pub name: Option<String>,

    /// Lowercased email address, unique across users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Optional display name
    pub name: Option<String>,

    /// Email address (normalized on insert)
    pub email: String,

    /// Argon2id password hash, never a plaintext password
    pub password_hash: String,
}

/// Public projection of a user embedded in question/answer payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Profile view with activity counts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub question_count: i64,
    pub answer_count: i64,
}

/// Lowercases and trims an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// A duplicate email surfaces as a unique violation on `users_email_key`.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email, ignoring case and surrounding whitespace
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Loads a profile with question and answer counts
    pub async fn profile(pool: &PgPool, id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.name, u.email, u.created_at,
                   (SELECT COUNT(*) FROM questions q WHERE q.author_id = u.id) AS question_count,
                   (SELECT COUNT(*) FROM answers a WHERE a.author_id = u.id) AS answer_count
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Deletes a user; questions, answers and likes cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
