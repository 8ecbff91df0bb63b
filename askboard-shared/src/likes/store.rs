/// Storage seam for likes
///
/// Like operations are written against [`LikeStore`] so the toggle and
/// lookup rules can run on PostgreSQL in production and on
/// [`MemoryLikeStore`](super::memory::MemoryLikeStore) in tests.
///
/// # Contract
///
/// Implementations must:
/// 1. Reject a second like for the same user and target with
///    [`LikeError::AlreadyLiked`], atomically with the insert
/// 2. Reject a like on a missing target with [`LikeError::TargetNotFound`]
/// 3. Reject a like by a missing user with [`LikeError::UnknownUser`]
/// 4. Report from [`remove`](LikeStore::remove) whether a row was deleted

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::{LikeError, LikeTarget, TargetKind};
use crate::db::errors::{constraint_violation, ConstraintViolation};
use crate::models::like::Like;

/// Foreign key on `likes.user_id`
const USER_FOREIGN_KEY: &str = "likes_user_id_fkey";

/// Persistence operations the like rules need
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// The like of `user_id` on `target`, if any
    async fn find(&self, user_id: Uuid, target: LikeTarget) -> Result<Option<Like>, LikeError>;

    /// Inserts a like, failing with `AlreadyLiked` if one exists
    async fn insert(&self, user_id: Uuid, target: LikeTarget) -> Result<Like, LikeError>;

    /// Deletes a like by ID; `false` if it was already gone
    async fn remove(&self, like_id: Uuid) -> Result<bool, LikeError>;

    /// Number of likes on a target
    async fn count(&self, target: LikeTarget) -> Result<i64, LikeError>;

    /// Subset of `ids` that `user_id` has liked, one query per call
    async fn liked_among(
        &self,
        user_id: Uuid,
        kind: TargetKind,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, LikeError>;
}

/// PostgreSQL-backed like store
#[derive(Debug, Clone)]
pub struct PgLikeStore {
    pool: PgPool,
}

impl PgLikeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps an insert failure onto the like error taxonomy
fn classify_insert_error(err: sqlx::Error, user_id: Uuid, target: LikeTarget) -> LikeError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique(_)) => LikeError::AlreadyLiked(target),
        Some(ConstraintViolation::ForeignKey(name)) if name.as_deref() == Some(USER_FOREIGN_KEY) => {
            LikeError::UnknownUser(user_id)
        }
        Some(ConstraintViolation::ForeignKey(_)) => LikeError::TargetNotFound(target),
        None => {
            warn!(user_id = %user_id, target = %target, error = %err, "Like insert failed");
            LikeError::Database(err)
        }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn find(&self, user_id: Uuid, target: LikeTarget) -> Result<Option<Like>, LikeError> {
        Ok(Like::find(&self.pool, user_id, target).await?)
    }

    async fn insert(&self, user_id: Uuid, target: LikeTarget) -> Result<Like, LikeError> {
        Like::create(&self.pool, user_id, target)
            .await
            .map_err(|err| classify_insert_error(err, user_id, target))
    }

    async fn remove(&self, like_id: Uuid) -> Result<bool, LikeError> {
        Ok(Like::delete(&self.pool, like_id).await?)
    }

    async fn count(&self, target: LikeTarget) -> Result<i64, LikeError> {
        Ok(Like::count_for(&self.pool, target).await?)
    }

    async fn liked_among(
        &self,
        user_id: Uuid,
        kind: TargetKind,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, LikeError> {
        Ok(Like::liked_target_ids(&self.pool, user_id, kind, ids).await?)
    }
}
