/// Likes on questions and answers
///
/// A like ties one user to exactly one target. The pair is unique: the
/// schema enforces it with `UNIQUE (user_id, question_id)` and
/// `UNIQUE (user_id, answer_id)`, and this module relies on those
/// constraints instead of locking. A lost race on insert is reported by the
/// store as [`LikeError::AlreadyLiked`] and each operation decides what that
/// means for it.
///
/// # Modules
///
/// - [`store`]: the [`LikeStore`](store::LikeStore) seam and its PostgreSQL implementation
/// - [`toggle`]: toggle, explicit like and explicit unlike
/// - [`lookup`]: which of a batch of targets a user has liked
/// - [`memory`]: in-process store with the same constraint semantics
///
/// # Example
///
/// ```no_run
/// use askboard_shared::auth::session::AuthContext;
/// use askboard_shared::likes::{store::PgLikeStore, toggle::toggle_like, LikeState, LikeTarget};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, actor: AuthContext, question_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store = PgLikeStore::new(pool);
/// let outcome = toggle_like(&store, &actor, LikeTarget::Question(question_id)).await?;
///
/// if outcome.state == LikeState::Liked {
///     println!("{} likes", outcome.like_count);
/// }
/// # Ok(())
/// # }
/// ```

pub mod lookup;
pub mod memory;
pub mod store;
pub mod toggle;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "lowercase")]
pub enum LikeTarget {
    Question(Uuid),
    Answer(Uuid),
}

/// Kind of like target, without the ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Question,
    Answer,
}

impl TargetKind {
    /// Column on `likes` holding this kind of target
    pub fn column(&self) -> &'static str {
        match self {
            TargetKind::Question => "question_id",
            TargetKind::Answer => "answer_id",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Question => "question",
            TargetKind::Answer => "answer",
        }
    }
}

impl LikeTarget {
    /// Builds a target from the two optional IDs of a request or row
    ///
    /// # Errors
    ///
    /// Returns [`LikeError::InvalidTarget`] unless exactly one ID is given.
    pub fn from_parts(question_id: Option<Uuid>, answer_id: Option<Uuid>) -> Result<Self, LikeError> {
        match (question_id, answer_id) {
            (Some(id), None) => Ok(LikeTarget::Question(id)),
            (None, Some(id)) => Ok(LikeTarget::Answer(id)),
            (Some(_), Some(_)) => Err(LikeError::InvalidTarget(
                "Specify either question_id or answer_id, not both".to_string(),
            )),
            (None, None) => Err(LikeError::InvalidTarget(
                "Either question_id or answer_id is required".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            LikeTarget::Question(_) => TargetKind::Question,
            LikeTarget::Answer(_) => TargetKind::Answer,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Question(id) | LikeTarget::Answer(id) => *id,
        }
    }

    /// Splits into the `(question_id, answer_id)` column pair
    pub fn as_columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            LikeTarget::Question(id) => (Some(*id), None),
            LikeTarget::Answer(id) => (None, Some(*id)),
        }
    }
}

impl std::fmt::Display for LikeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind().as_str(), self.id())
    }
}

/// Whether the user likes the target after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeState {
    Liked,
    Unliked,
}

impl LikeState {
    pub fn is_liked(&self) -> bool {
        matches!(self, LikeState::Liked)
    }
}

/// Result of a like operation, with the fresh count for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub target: LikeTarget,
    pub state: LikeState,
    pub like_count: i64,
}

/// Error type for like operations
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    /// Neither or both of question/answer were named
    #[error("Invalid like target: {0}")]
    InvalidTarget(String),

    /// A like for this user and target already exists
    #[error("Already liked {0}")]
    AlreadyLiked(LikeTarget),

    /// No like exists for this user and target
    #[error("Not liked: {0}")]
    NotLiked(LikeTarget),

    /// The target question or answer does not exist
    #[error("Target not found: {0}")]
    TargetNotFound(LikeTarget),

    /// The acting user no longer exists
    #[error("Unknown user {0}")]
    UnknownUser(Uuid),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
