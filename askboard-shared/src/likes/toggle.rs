/// Toggle, like and unlike
///
/// All three read the current like, then write, then recount. The read is
/// only a hint: the unique constraint behind [`LikeStore::insert`] decides
/// who wins when two requests from the same user overlap, and the loser sees
/// [`LikeError::AlreadyLiked`].
///
/// | Operation | Existing like | Insert conflict | Missing like |
/// |-----------|---------------|-----------------|--------------|
/// | toggle    | remove        | report `Liked`  | insert       |
/// | like      | `AlreadyLiked`| `AlreadyLiked`  | insert       |
/// | unlike    | remove        | n/a             | `NotLiked`   |

use tracing::{debug, info};

use super::store::LikeStore;
use super::{LikeError, LikeOutcome, LikeState, LikeTarget};
use crate::auth::session::AuthContext;

/// Flips the actor's like on `target` and returns the new state and count
///
/// If a concurrent request inserted the like between our read and our
/// insert, the like exists as the caller wanted and the result is `Liked`.
/// If a concurrent request removed it first, the result is `Unliked`.
///
/// # Errors
///
/// - [`LikeError::TargetNotFound`] if the question or answer does not exist
/// - [`LikeError::UnknownUser`] if the actor's account is gone
/// - [`LikeError::Database`] on storage failure
pub async fn toggle_like<S>(
    store: &S,
    actor: &AuthContext,
    target: LikeTarget,
) -> Result<LikeOutcome, LikeError>
where
    S: LikeStore + ?Sized,
{
    let state = match store.find(actor.user_id, target).await? {
        Some(existing) => {
            if !store.remove(existing.id).await? {
                debug!(user_id = %actor.user_id, target = %target, "Like already removed concurrently");
            }
            LikeState::Unliked
        }
        None => match store.insert(actor.user_id, target).await {
            Ok(_) => LikeState::Liked,
            Err(LikeError::AlreadyLiked(_)) => {
                debug!(user_id = %actor.user_id, target = %target, "Concurrent like won the insert");
                LikeState::Liked
            }
            Err(err) => return Err(err),
        },
    };

    let like_count = store.count(target).await?;

    info!(
        user_id = %actor.user_id,
        target = %target,
        liked = state.is_liked(),
        like_count,
        "Like toggled"
    );

    Ok(LikeOutcome {
        target,
        state,
        like_count,
    })
}

/// Adds the actor's like on `target`
///
/// # Errors
///
/// [`LikeError::AlreadyLiked`] if the like exists, including when a
/// concurrent request created it; otherwise as [`toggle_like`].
pub async fn like<S>(store: &S, actor: &AuthContext, target: LikeTarget) -> Result<LikeOutcome, LikeError>
where
    S: LikeStore + ?Sized,
{
    if store.find(actor.user_id, target).await?.is_some() {
        return Err(LikeError::AlreadyLiked(target));
    }

    store.insert(actor.user_id, target).await?;
    let like_count = store.count(target).await?;

    info!(user_id = %actor.user_id, target = %target, like_count, "Liked");

    Ok(LikeOutcome {
        target,
        state: LikeState::Liked,
        like_count,
    })
}

/// Removes the actor's like on `target`
///
/// # Errors
///
/// [`LikeError::NotLiked`] if there is no like to remove, including when a
/// concurrent request removed it first.
pub async fn unlike<S>(store: &S, actor: &AuthContext, target: LikeTarget) -> Result<LikeOutcome, LikeError>
where
    S: LikeStore + ?Sized,
{
    let existing = store
        .find(actor.user_id, target)
        .await?
        .ok_or(LikeError::NotLiked(target))?;

    if !store.remove(existing.id).await? {
        return Err(LikeError::NotLiked(target));
    }

    let like_count = store.count(target).await?;

    info!(user_id = %actor.user_id, target = %target, like_count, "Unliked");

    Ok(LikeOutcome {
        target,
        state: LikeState::Unliked,
        like_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likes::memory::MemoryLikeStore;
    use crate::likes::TargetKind;
    use crate::models::like::Like;
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    fn actor(user_id: Uuid) -> AuthContext {
        AuthContext {
            user_id,
            email: "reader@example.com".to_string(),
        }
    }

    async fn seeded() -> (MemoryLikeStore, AuthContext, Uuid, Uuid) {
        let store = MemoryLikeStore::new();
        let (user, question, answer) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        store.add_user(user).await;
        store.add_answer(answer, question).await;
        (store, actor(user), question, answer)
    }

    /// Hides existing likes from `find`, as if another request inserted
    /// one between our read and our write
    struct LosesRace(MemoryLikeStore);

    #[async_trait]
    impl LikeStore for LosesRace {
        async fn find(&self, _: Uuid, _: LikeTarget) -> Result<Option<Like>, LikeError> {
            Ok(None)
        }
        async fn insert(&self, user_id: Uuid, target: LikeTarget) -> Result<Like, LikeError> {
            self.0.insert(user_id, target).await
        }
        async fn remove(&self, like_id: Uuid) -> Result<bool, LikeError> {
            self.0.remove(like_id).await
        }
        async fn count(&self, target: LikeTarget) -> Result<i64, LikeError> {
            self.0.count(target).await
        }
        async fn liked_among(
            &self,
            user_id: Uuid,
            kind: TargetKind,
            ids: &[Uuid],
        ) -> Result<Vec<Uuid>, LikeError> {
            self.0.liked_among(user_id, kind, ids).await
        }
    }

    #[tokio::test]
    async fn test_toggle_likes_then_unlikes() {
        let (store, actor, question, _) = seeded().await;
        let target = LikeTarget::Question(question);

        let first = toggle_like(&store, &actor, target).await.unwrap();
        assert_eq!(first.state, LikeState::Liked);
        assert_eq!(first.like_count, 1);

        let second = toggle_like(&store, &actor, target).await.unwrap();
        assert_eq!(second.state, LikeState::Unliked);
        assert_eq!(second.like_count, 0);
        assert_eq!(store.rows_for(actor.user_id, target).await, 0);
    }

    #[tokio::test]
    async fn test_toggle_answer_counts_other_users() {
        let (store, actor, _, answer) = seeded().await;
        let other = Uuid::new_v4();
        store.add_user(other).await;
        let target = LikeTarget::Answer(answer);

        store.insert(other, target).await.unwrap();
        let outcome = toggle_like(&store, &actor, target).await.unwrap();

        assert_eq!(outcome.state, LikeState::Liked);
        assert_eq!(outcome.like_count, 2);
    }

    #[tokio::test]
    async fn test_toggle_conflict_reports_liked() {
        let (inner, actor, question, _) = seeded().await;
        let target = LikeTarget::Question(question);
        inner.insert(actor.user_id, target).await.unwrap();

        let store = LosesRace(inner);
        let outcome = toggle_like(&store, &actor, target).await.unwrap();

        assert_eq!(outcome.state, LikeState::Liked);
        assert_eq!(outcome.like_count, 1);
        assert_eq!(store.0.rows_for(actor.user_id, target).await, 1);
    }

    #[tokio::test]
    async fn test_toggle_missing_target() {
        let (store, actor, _, _) = seeded().await;
        let target = LikeTarget::Question(Uuid::new_v4());

        let err = toggle_like(&store, &actor, target).await.unwrap_err();
        assert!(matches!(err, LikeError::TargetNotFound(t) if t == target));
    }

    #[tokio::test]
    async fn test_like_twice_is_rejected() {
        let (store, actor, question, _) = seeded().await;
        let target = LikeTarget::Question(question);

        like(&store, &actor, target).await.unwrap();
        let err = like(&store, &actor, target).await.unwrap_err();

        assert!(matches!(err, LikeError::AlreadyLiked(_)));
        assert_eq!(store.rows_for(actor.user_id, target).await, 1);
    }

    #[tokio::test]
    async fn test_like_conflict_is_rejected() {
        let (inner, actor, question, _) = seeded().await;
        let target = LikeTarget::Question(question);
        inner.insert(actor.user_id, target).await.unwrap();

        let err = like(&LosesRace(inner), &actor, target).await.unwrap_err();
        assert!(matches!(err, LikeError::AlreadyLiked(_)));
    }

    #[tokio::test]
    async fn test_unlike_without_like() {
        let (store, actor, _, answer) = seeded().await;
        let target = LikeTarget::Answer(answer);

        let err = unlike(&store, &actor, target).await.unwrap_err();
        assert!(matches!(err, LikeError::NotLiked(t) if t == target));

        like(&store, &actor, target).await.unwrap();
        let outcome = unlike(&store, &actor, target).await.unwrap();
        assert_eq!(outcome.state, LikeState::Unliked);
        assert_eq!(outcome.like_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_likes_leave_one_row() {
        let (store, actor, question, _) = seeded().await;
        let store = Arc::new(store);
        let target = LikeTarget::Question(question);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let actor = actor.clone();
                tokio::spawn(async move { like(store.as_ref(), &actor, target).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(LikeError::AlreadyLiked(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(store.rows_for(actor.user_id, target).await, 1);
    }
}
