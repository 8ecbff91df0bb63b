/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: access and refresh tokens
/// - [`session`]: finding and validating the token on a request
/// - [`authorization`]: author-only checks
///
/// # Example
///
/// ```no_run
/// use askboard_shared::auth::password::{hash_password, verify_password};
/// use askboard_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), "ada@example.com", "a-secret-key-of-at-least-32-bytes!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod session;
