/// Like rows
///
/// Row-level SQL for the `likes` table. Callers normally go through
/// `likes::store::PgLikeStore`, which turns constraint failures into
/// `LikeError` variants.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE likes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     question_id UUID REFERENCES questions(id) ON DELETE CASCADE,
///     answer_id UUID REFERENCES answers(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (num_nonnulls(question_id, answer_id) = 1),
///     CONSTRAINT likes_user_question_key UNIQUE (user_id, question_id),
///     CONSTRAINT likes_user_answer_key UNIQUE (user_id, answer_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::likes::{LikeTarget, TargetKind};

/// A like row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Option<Uuid>,
    pub answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// The target of this like
    ///
    /// The check constraint guarantees exactly one column is set, so this is
    /// `None` only for rows built by hand.
    pub fn target(&self) -> Option<LikeTarget> {
        LikeTarget::from_parts(self.question_id, self.answer_id).ok()
    }

    /// Finds the like of `user_id` on `target`
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        target: LikeTarget,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT id, user_id, question_id, answer_id, created_at
             FROM likes
             WHERE user_id = $1 AND {} = $2",
            target.kind().column()
        );

        sqlx::query_as::<_, Like>(&query)
            .bind(user_id)
            .bind(target.id())
            .fetch_optional(pool)
            .await
    }

    /// Inserts a like
    ///
    /// # Errors
    ///
    /// - unique violation on `likes_user_question_key` / `likes_user_answer_key`
    ///   when the pair already exists
    /// - foreign-key violation when the user or target is missing
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        target: LikeTarget,
    ) -> Result<Self, sqlx::Error> {
        let (question_id, answer_id) = target.as_columns();

        sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (user_id, question_id, answer_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, question_id, answer_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(answer_id)
        .fetch_one(pool)
        .await
    }

    /// Deletes a like by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of likes on a target
    pub async fn count_for(pool: &PgPool, target: LikeTarget) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM likes WHERE {} = $1",
            target.kind().column()
        );

        sqlx::query_scalar(&query)
            .bind(target.id())
            .fetch_one(pool)
            .await
    }

    /// Which of `ids` (all of one kind) `user_id` has liked
    pub async fn liked_target_ids(
        pool: &PgPool,
        user_id: Uuid,
        kind: TargetKind,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let column = kind.column();
        let query = format!(
            "SELECT {column} FROM likes WHERE user_id = $1 AND {column} = ANY($2)"
        );

        sqlx::query_scalar::<_, Uuid>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Number of like rows for a user and target; at most one by construction
    pub async fn count_rows(
        pool: &PgPool,
        user_id: Uuid,
        target: LikeTarget,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM likes WHERE user_id = $1 AND {} = $2",
            target.kind().column()
        );

        sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(target.id())
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_row() {
        let question_id = Uuid::new_v4();
        let like = Like {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            question_id: Some(question_id),
            answer_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(like.target(), Some(LikeTarget::Question(question_id)));

        let broken = Like {
            answer_id: Some(Uuid::new_v4()),
            ..like
        };
        assert_eq!(broken.target(), None);
    }
}
