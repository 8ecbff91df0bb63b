/// Answer model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE answers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content TEXT NOT NULL,
///     question_id UUID NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::AuthorSummary;

/// An answer row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub content: String,

    /// Parent question, fixed at creation
    pub question_id: Uuid,

    /// Owner, fixed at creation
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an answer
#[derive(Debug, Clone)]
pub struct CreateAnswer {
    pub content: String,
    pub question_id: Uuid,
    pub author_id: Uuid,
}

/// Answer with author and like count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub content: String,
    pub question_id: Uuid,

    /// Parent question title, present in per-user listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_title: Option<String>,

    pub author: AuthorSummary,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AnswerViewRow {
    id: Uuid,
    content: String,
    question_id: Uuid,
    question_title: Option<String>,
    author_id: Uuid,
    author_name: Option<String>,
    author_email: String,
    like_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnswerViewRow> for AnswerView {
    fn from(row: AnswerViewRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            question_id: row.question_id,
            question_title: row.question_title,
            author: AuthorSummary {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
            },
            like_count: row.like_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Answer {
    /// Inserts an answer
    ///
    /// # Errors
    ///
    /// A missing parent question surfaces as a foreign-key violation on
    /// `answers_question_id_fkey`.
    pub async fn create(pool: &PgPool, data: CreateAnswer) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (content, question_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, question_id, author_id, created_at, updated_at
            "#,
        )
        .bind(data.content)
        .bind(data.question_id)
        .bind(data.author_id)
        .fetch_one(pool)
        .await
    }

    /// Finds an answer by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, content, question_id, author_id, created_at, updated_at
            FROM answers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Loads the rendered view of one answer
    pub async fn view(pool: &PgPool, id: Uuid) -> Result<Option<AnswerView>, sqlx::Error> {
        let row = sqlx::query_as::<_, AnswerViewRow>(
            r#"
            SELECT a.id, a.content, a.question_id, NULL::text AS question_title,
                   a.author_id, u.name AS author_name, u.email AS author_email,
                   (SELECT COUNT(*) FROM likes l WHERE l.answer_id = a.id) AS like_count,
                   a.created_at, a.updated_at
            FROM answers a
            JOIN users u ON u.id = a.author_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(AnswerView::from))
    }

    /// Answers to a question, newest first
    pub async fn list_for_question(
        pool: &PgPool,
        question_id: Uuid,
    ) -> Result<Vec<AnswerView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AnswerViewRow>(
            r#"
            SELECT a.id, a.content, a.question_id, NULL::text AS question_title,
                   a.author_id, u.name AS author_name, u.email AS author_email,
                   (SELECT COUNT(*) FROM likes l WHERE l.answer_id = a.id) AS like_count,
                   a.created_at, a.updated_at
            FROM answers a
            JOIN users u ON u.id = a.author_id
            WHERE a.question_id = $1
            ORDER BY a.created_at DESC, a.id
            "#,
        )
        .bind(question_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(AnswerView::from).collect())
    }

    /// Answers written by a user, newest first, with their question titles
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: Uuid,
    ) -> Result<Vec<AnswerView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AnswerViewRow>(
            r#"
            SELECT a.id, a.content, a.question_id, q.title::text AS question_title,
                   a.author_id, u.name AS author_name, u.email AS author_email,
                   (SELECT COUNT(*) FROM likes l WHERE l.answer_id = a.id) AS like_count,
                   a.created_at, a.updated_at
            FROM answers a
            JOIN users u ON u.id = a.author_id
            JOIN questions q ON q.id = a.question_id
            WHERE a.author_id = $1
            ORDER BY a.created_at DESC, a.id
            "#,
        )
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(AnswerView::from).collect())
    }

    /// Replaces the content of an answer
    ///
    /// Returns `None` if the answer does not exist.
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(
            r#"
            UPDATE answers
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, question_id, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an answer; its likes cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
