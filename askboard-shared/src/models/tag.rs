/// Tag model and tag lifecycle helpers
///
/// Tags are many-to-many with questions through `question_tags`. They are
/// created on demand when a question names them and removed again once no
/// question references them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(30) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE question_tags (
///     question_id UUID NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id),
///     PRIMARY KEY (question_id, tag_id)
/// );
/// ```
///
/// The write helpers take a `PgConnection` so they can run inside the
/// transaction of the question write that triggered them.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Longest accepted tag name, in characters
pub const MAX_TAG_LENGTH: usize = 30;

/// Most tags a single question may carry
pub const MAX_TAGS_PER_QUESTION: usize = 5;

/// A tag row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// A tag with the number of questions using it
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagCount {
    pub name: String,
    pub question_count: i64,
}

/// Cleans a list of user-supplied tag names
///
/// Names are trimmed, blanks are dropped and duplicates removed while
/// keeping first-seen order.
///
/// # Errors
///
/// Returns a message naming the first tag longer than [`MAX_TAG_LENGTH`].
pub fn normalize_tag_names(raw: &[String]) -> Result<Vec<String>, String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for name in raw.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if name.chars().count() > MAX_TAG_LENGTH {
            return Err(format!(
                "Tag '{}' must be at most {} characters",
                name, MAX_TAG_LENGTH
            ));
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

impl Tag {
    /// Looks up or inserts every named tag and returns their rows
    ///
    /// `names` must already be deduplicated; a repeated name would make the
    /// upsert touch the same row twice.
    pub async fn find_or_create_all(
        conn: &mut PgConnection,
        names: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        // The no-op update makes RETURNING yield pre-existing rows too.
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name)
            SELECT UNNEST($1::text[])
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(names)
        .fetch_all(&mut *conn)
        .await?;

        Ok(tags)
    }

    /// Links tags to a question, ignoring links that already exist
    pub async fn attach(
        conn: &mut PgConnection,
        question_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if tag_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO question_tags (question_id, tag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(question_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Removes every tag link of a question and returns the detached tag IDs
    pub async fn detach_all(
        conn: &mut PgConnection,
        question_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let tag_ids = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM question_tags WHERE question_id = $1 RETURNING tag_id",
        )
        .bind(question_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(tag_ids)
    }

    /// IDs of the tags currently linked to a question
    pub async fn ids_for_question(
        conn: &mut PgConnection,
        question_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT tag_id FROM question_tags WHERE question_id = $1")
            .bind(question_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Deletes those of `candidates` that no question references any more
    ///
    /// Returns the number of tags removed.
    pub async fn delete_orphans_among(
        conn: &mut PgConnection,
        candidates: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM tags t
            WHERE t.id = ANY($1)
              AND NOT EXISTS (SELECT 1 FROM question_tags qt WHERE qt.tag_id = t.id)
            "#,
        )
        .bind(candidates)
        .execute(&mut *conn)
        .await?;

        debug!(removed = result.rows_affected(), "Pruned orphan tags");
        Ok(result.rows_affected())
    }

    /// Deletes every tag without an associated question
    pub async fn delete_all_orphans(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tags t
            WHERE NOT EXISTS (SELECT 1 FROM question_tags qt WHERE qt.tag_id = t.id)
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Most-used tags, by number of questions, descending
    pub async fn popular(pool: &PgPool, limit: i64) -> Result<Vec<TagCount>, sqlx::Error> {
        let tags = sqlx::query_as::<_, TagCount>(
            r#"
            SELECT t.name, COUNT(qt.question_id) AS question_count
            FROM tags t
            LEFT JOIN question_tags qt ON qt.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY question_count DESC, t.name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Finds a tag by exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
