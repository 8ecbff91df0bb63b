/// Bulk like status
///
/// Answers "which of these questions and answers has this user liked" with
/// at most one store lookup per target kind, whatever the batch size. Used
/// when rendering a question page so each item can show a liked marker.

use futures::try_join;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::store::LikeStore;
use super::{LikeError, TargetKind};
use crate::auth::session::AuthContext;

/// Targets the user has liked, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LikedSet {
    pub questions: HashSet<Uuid>,
    pub answers: HashSet<Uuid>,
}

impl LikedSet {
    pub fn question_liked(&self, id: &Uuid) -> bool {
        self.questions.contains(id)
    }

    pub fn answer_liked(&self, id: &Uuid) -> bool {
        self.answers.contains(id)
    }
}

/// Looks up which of `question_ids` and `answer_ids` the actor has liked
///
/// Duplicate IDs are ignored. A kind with no IDs issues no lookup, so an
/// empty request touches no storage at all. The result only ever contains
/// IDs that were asked about.
pub async fn bulk_like_status<S>(
    store: &S,
    actor: &AuthContext,
    question_ids: &[Uuid],
    answer_ids: &[Uuid],
) -> Result<LikedSet, LikeError>
where
    S: LikeStore + ?Sized,
{
    let (questions, answers) = try_join!(
        liked_of_kind(store, actor, TargetKind::Question, question_ids),
        liked_of_kind(store, actor, TargetKind::Answer, answer_ids),
    )?;

    debug!(
        user_id = %actor.user_id,
        questions = questions.len(),
        answers = answers.len(),
        "Resolved bulk like status"
    );

    Ok(LikedSet { questions, answers })
}

async fn liked_of_kind<S>(
    store: &S,
    actor: &AuthContext,
    kind: TargetKind,
    ids: &[Uuid],
) -> Result<HashSet<Uuid>, LikeError>
where
    S: LikeStore + ?Sized,
{
    let requested: HashSet<Uuid> = ids.iter().copied().collect();
    if requested.is_empty() {
        return Ok(HashSet::new());
    }

    let unique: Vec<Uuid> = requested.iter().copied().collect();
    let liked = store.liked_among(actor.user_id, kind, &unique).await?;

    Ok(liked.into_iter().filter(|id| requested.contains(id)).collect())
}
