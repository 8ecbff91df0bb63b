/// Database models for Askboard
///
/// Each model owns the SQL for its table. Multi-table writes (question plus
/// tags) run in a single transaction inside the model.
///
/// # Models
///
/// - `user`: accounts and public profiles
/// - `question`: questions with tag management and cleanup on delete
/// - `answer`: answers to questions
/// - `tag`: shared tags and orphan pruning
/// - `like`: like rows (see `crate::likes` for the rules around them)
///
/// # Example
///
/// ```no_run
/// use askboard_shared::models::user::{User, CreateUser};
/// use askboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: Some("Ada".to_string()),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod answer;
pub mod like;
pub mod question;
pub mod tag;
pub mod user;
