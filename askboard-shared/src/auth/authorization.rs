/// Ownership checks
///
/// Questions and answers may only be edited or deleted by their author.
/// Likes need no check beyond authentication: a user only ever touches
/// their own like rows.

use uuid::Uuid;

use super::session::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not the author of the resource
    #[error("Only the author can modify this {0}")]
    NotAuthor(&'static str),
}

/// Requires `actor` to be the author of a `resource`
///
/// # Example
///
/// ```
/// use askboard_shared::auth::authorization::require_author;
/// use askboard_shared::auth::session::AuthContext;
/// use uuid::Uuid;
///
/// let actor = AuthContext { user_id: Uuid::new_v4(), email: "a@b.c".to_string() };
/// assert!(require_author(&actor, actor.user_id, "question").is_ok());
/// assert!(require_author(&actor, Uuid::new_v4(), "question").is_err());
/// ```
pub fn require_author(
    actor: &AuthContext,
    author_id: Uuid,
    resource: &'static str,
) -> Result<(), AuthzError> {
    if actor.user_id == author_id {
        Ok(())
    } else {
        Err(AuthzError::NotAuthor(resource))
    }
}
