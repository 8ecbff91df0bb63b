/// Question model and database operations
///
/// Questions own their answers, their likes and their tag links: deleting a
/// question cascades to all three. Tag rows themselves are shared and are
/// pruned explicitly once orphaned.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE questions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     content TEXT NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use askboard_shared::models::question::{CreateQuestion, ListQuestions, Question};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, author_id: Uuid) -> Result<(), sqlx::Error> {
/// let question = Question::create_with_tags(&pool, CreateQuestion {
///     title: "How do lifetimes work?".to_string(),
///     content: "I keep fighting the borrow checker.".to_string(),
///     author_id,
///     tags: vec!["rust".to_string(), "lifetimes".to_string()],
/// })
/// .await?;
///
/// let tagged = Question::list(&pool, ListQuestions {
///     tag: Some("rust".to_string()),
///     ..Default::default()
/// })
/// .await?;
/// assert!(tagged.iter().any(|q| q.id == question.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::tag::Tag;
use super::user::AuthorSummary;

/// A question row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,

    /// Owner, fixed at creation
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a question
///
/// `tags` must already be normalized (see `tag::normalize_tag_names`).
#[derive(Debug, Clone)]
pub struct CreateQuestion {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub tags: Vec<String>,
}

/// Replacement title, content and tag set for an existing question
#[derive(Debug, Clone)]
pub struct UpdateQuestion {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Filters for listing questions
#[derive(Debug, Clone)]
pub struct ListQuestions {
    /// Only questions carrying this exact tag
    pub tag: Option<String>,

    /// Only questions by this author
    pub author_id: Option<Uuid>,

    pub limit: i64,
    pub offset: i64,
}

impl Default for ListQuestions {
    fn default() -> Self {
        Self {
            tag: None,
            author_id: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// Question with author, tags and counters, as rendered in lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorSummary,
    pub tags: Vec<String>,
    pub answer_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct QuestionSummaryRow {
    id: Uuid,
    title: String,
    content: String,
    author_id: Uuid,
    author_name: Option<String>,
    author_email: String,
    tags: Vec<String>,
    answer_count: i64,
    like_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QuestionSummaryRow> for QuestionSummary {
    fn from(row: QuestionSummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author: AuthorSummary {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
            },
            tags: row.tags,
            answer_count: row.answer_count,
            like_count: row.like_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SUMMARY_SELECT: &str = r#"
    SELECT q.id, q.title, q.content, q.author_id,
           u.name AS author_name, u.email AS author_email,
           ARRAY(
               SELECT t.name::text FROM tags t
               JOIN question_tags qt ON qt.tag_id = t.id
               WHERE qt.question_id = q.id
               ORDER BY t.name
           ) AS tags,
           (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) AS answer_count,
           (SELECT COUNT(*) FROM likes l WHERE l.question_id = q.id) AS like_count,
           q.created_at, q.updated_at
    FROM questions q
    JOIN users u ON u.id = q.author_id
"#;

impl Question {
    /// Creates a question and connects-or-creates its tags atomically
    ///
    /// # Errors
    ///
    /// An unknown author surfaces as a foreign-key violation on
    /// `questions_author_id_fkey`; nothing is written in that case.
    pub async fn create_with_tags(pool: &PgPool, data: CreateQuestion) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        let tags = Tag::find_or_create_all(&mut tx, &data.tags).await?;
        let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
        Tag::attach(&mut tx, question.id, &tag_ids).await?;

        tx.commit().await?;

        info!(question_id = %question.id, tags = tag_ids.len(), "Question created");
        Ok(question)
    }

    /// Finds a question row by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Loads the rendered summary of one question
    pub async fn summary(pool: &PgPool, id: Uuid) -> Result<Option<QuestionSummary>, sqlx::Error> {
        let query = format!("{} WHERE q.id = $1", SUMMARY_SELECT);

        let row = sqlx::query_as::<_, QuestionSummaryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(QuestionSummary::from))
    }

    /// Lists question summaries, newest first
    pub async fn list(pool: &PgPool, filter: ListQuestions) -> Result<Vec<QuestionSummary>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE ($1::text IS NULL OR EXISTS (
                      SELECT 1 FROM question_tags qt
                      JOIN tags t ON t.id = qt.tag_id
                      WHERE qt.question_id = q.id AND t.name = $1))
              AND ($2::uuid IS NULL OR q.author_id = $2)
            ORDER BY q.created_at DESC, q.id
            LIMIT $3 OFFSET $4
            "#,
            SUMMARY_SELECT
        );

        let rows = sqlx::query_as::<_, QuestionSummaryRow>(&query)
            .bind(filter.tag)
            .bind(filter.author_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(QuestionSummary::from).collect())
    }

    /// Replaces title, content and tags, pruning tags left unused
    ///
    /// Returns `None` if the question no longer exists. Ownership is checked
    /// by the caller; the author never changes.
    pub async fn update_with_tags(
        pool: &PgPool,
        id: Uuid,
        data: UpdateQuestion,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET title = $2, content = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.content)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(question) = question else {
            tx.rollback().await?;
            return Ok(None);
        };

        let previous = Tag::detach_all(&mut tx, id).await?;
        let tags = Tag::find_or_create_all(&mut tx, &data.tags).await?;
        let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
        Tag::attach(&mut tx, id, &tag_ids).await?;

        let dropped: Vec<Uuid> = previous
            .into_iter()
            .filter(|tag_id| !tag_ids.contains(tag_id))
            .collect();
        let pruned = Tag::delete_orphans_among(&mut tx, &dropped).await?;

        tx.commit().await?;

        debug!(question_id = %id, pruned_tags = pruned, "Question updated");
        Ok(Some(question))
    }

    /// Deletes a question and prunes tags it leaves orphaned
    ///
    /// Answers, likes on the question and on its answers, and tag links go
    /// with it through the schema's cascades. Everything happens in one
    /// transaction. Returns the number of pruned tags, or `None` if the
    /// question did not exist.
    pub async fn delete_with_cleanup(pool: &PgPool, id: Uuid) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tag_ids = Tag::ids_for_question(&mut tx, id).await?;

        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let pruned = Tag::delete_orphans_among(&mut tx, &tag_ids).await?;

        tx.commit().await?;

        info!(question_id = %id, pruned_tags = pruned, "Question deleted");
        Ok(Some(pruned))
    }
}
