/// In-process like store
///
/// Holds users, questions, answers and likes in memory and enforces the same
/// rules as the PostgreSQL schema: one like per user and target, existing
/// users and targets only, and cascading removal when a target goes away.
/// Store calls are counted, and [`LikeStore::liked_among`] lookups separately,
/// so callers can assert how much storage an operation touched.
///
/// # Example
///
/// ```
/// use askboard_shared::likes::memory::MemoryLikeStore;
/// use askboard_shared::likes::store::LikeStore;
/// use askboard_shared::likes::LikeTarget;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryLikeStore::new();
/// let (user, question) = (Uuid::new_v4(), Uuid::new_v4());
/// store.add_user(user).await;
/// store.add_question(question).await;
///
/// store.insert(user, LikeTarget::Question(question)).await?;
/// assert!(store.insert(user, LikeTarget::Question(question)).await.is_err());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::LikeStore;
use super::{LikeError, LikeTarget, TargetKind};
use crate::models::like::Like;

#[derive(Debug, Default)]
struct State {
    users: HashSet<Uuid>,
    questions: HashSet<Uuid>,
    /// answer -> parent question
    answers: HashMap<Uuid, Uuid>,
    likes: Vec<Like>,
}

impl State {
    fn target_exists(&self, target: LikeTarget) -> bool {
        match target {
            LikeTarget::Question(id) => self.questions.contains(&id),
            LikeTarget::Answer(id) => self.answers.contains_key(&id),
        }
    }
}

/// Like store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryLikeStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    lookups: AtomicUsize,
}

impl MemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, id: Uuid) {
        self.state.lock().await.users.insert(id);
    }

    pub async fn add_question(&self, id: Uuid) {
        self.state.lock().await.questions.insert(id);
    }

    /// Registers an answer; the parent question is registered with it
    pub async fn add_answer(&self, id: Uuid, question_id: Uuid) {
        let mut state = self.state.lock().await;
        state.questions.insert(question_id);
        state.answers.insert(id, question_id);
    }

    /// Removes a question with its answers and every like on either
    pub async fn remove_question(&self, id: Uuid) {
        let mut state = self.state.lock().await;
        state.questions.remove(&id);
        state.answers.retain(|_, parent| *parent != id);

        let answers: HashSet<Uuid> = state.answers.keys().copied().collect();
        state.likes.retain(|like| match like.target() {
            Some(LikeTarget::Question(q)) => q != id,
            Some(LikeTarget::Answer(a)) => answers.contains(&a),
            None => false,
        });
    }

    /// Number of like rows for a user and target
    pub async fn rows_for(&self, user_id: Uuid, target: LikeTarget) -> usize {
        self.state
            .lock()
            .await
            .likes
            .iter()
            .filter(|like| like.user_id == user_id && like.target() == Some(target))
            .count()
    }

    /// Number of like lookups issued so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of [`LikeStore`] calls of any kind so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LikeStore for MemoryLikeStore {
    async fn find(&self, user_id: Uuid, target: LikeTarget) -> Result<Option<Like>, LikeError> {
        self.record_call();
        let state = self.state.lock().await;
        Ok(state
            .likes
            .iter()
            .find(|like| like.user_id == user_id && like.target() == Some(target))
            .cloned())
    }

    async fn insert(&self, user_id: Uuid, target: LikeTarget) -> Result<Like, LikeError> {
        self.record_call();
        let mut state = self.state.lock().await;

        if !state.users.contains(&user_id) {
            return Err(LikeError::UnknownUser(user_id));
        }
        if !state.target_exists(target) {
            return Err(LikeError::TargetNotFound(target));
        }
        if state
            .likes
            .iter()
            .any(|like| like.user_id == user_id && like.target() == Some(target))
        {
            return Err(LikeError::AlreadyLiked(target));
        }

        let (question_id, answer_id) = target.as_columns();
        let like = Like {
            id: Uuid::new_v4(),
            user_id,
            question_id,
            answer_id,
            created_at: Utc::now(),
        };
        state.likes.push(like.clone());
        Ok(like)
    }

    async fn remove(&self, like_id: Uuid) -> Result<bool, LikeError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let before = state.likes.len();
        state.likes.retain(|like| like.id != like_id);
        Ok(state.likes.len() < before)
    }

    async fn count(&self, target: LikeTarget) -> Result<i64, LikeError> {
        self.record_call();
        let state = self.state.lock().await;
        let count = state
            .likes
            .iter()
            .filter(|like| like.target() == Some(target))
            .count();
        Ok(count as i64)
    }

    async fn liked_among(
        &self,
        user_id: Uuid,
        kind: TargetKind,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, LikeError> {
        self.record_call();
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock().await;
        Ok(state
            .likes
            .iter()
            .filter(|like| like.user_id == user_id)
            .filter_map(|like| like.target())
            .filter(|target| target.kind() == kind && ids.contains(&target.id()))
            .map(|target| target.id())
            .collect())
    }
}
