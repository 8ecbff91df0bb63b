/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: health check
/// - `auth`: register, login, refresh, logout
/// - `questions`: question CRUD with tags
/// - `answers`: answer CRUD
/// - `likes`: like, unlike, toggle and bulk status
/// - `tags`: popular tags and orphan cleanup
/// - `users`: public profiles and per-user content

pub mod answers;
pub mod auth;
pub mod health;
pub mod likes;
pub mod questions;
pub mod tags;
pub mod users;

/// Largest page size any list endpoint returns
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolves a requested page size against a default and [`MAX_PAGE_SIZE`]
pub fn page_limit(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}
