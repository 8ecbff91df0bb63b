/// Session tokens
///
/// Access and refresh tokens are HS256 JWTs carrying the user ID and email.
/// An access token authenticates requests for 24 hours; a refresh token can
/// be exchanged for a new access token for 30 days.
///
/// # Example
///
/// ```
/// use askboard_shared::auth::jwt::{issue_token_pair, validate_access_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-key-of-at-least-32-bytes!!";
/// let user_id = Uuid::new_v4();
///
/// let tokens = issue_token_pair(user_id, "ada@example.com", secret)?;
/// let claims = validate_access_token(&tokens.access_token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer stamped into and required on every token
pub const ISSUER: &str = "askboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer or format check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is valid but of the other type
    #[error("Expected {expected} token")]
    WrongType { expected: &'static str },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// User email at issue time
    pub email: String,

    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,

    pub token_type: TokenType,
}

impl Claims {
    /// Claims with the default lifetime for `token_type`
    pub fn new(user_id: Uuid, email: impl Into<String>, token_type: TokenType) -> Self {
        Self::with_lifetime(user_id, email, token_type, token_type.lifetime())
    }

    pub fn with_lifetime(
        user_id: Uuid,
        email: impl Into<String>,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds until expiry, zero once expired
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Access and refresh token issued together at login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Issues a fresh access/refresh pair for a user
pub fn issue_token_pair(user_id: Uuid, email: &str, secret: &str) -> Result<TokenPair, JwtError> {
    let access = Claims::new(user_id, email, TokenType::Access);
    let refresh = Claims::new(user_id, email, TokenType::Refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
        token_type: "Bearer",
        expires_in: access.expires_in(),
    })
}

/// Verifies signature, issuer, expiry and not-before, and returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongType {
            expected: expected.as_str(),
        });
    }

    Ok(claims)
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Access)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Refresh)
}

/// Exchanges a refresh token for a new access token for the same user
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh = validate_refresh_token(refresh_token, secret)?;
    let access = Claims::new(refresh.sub, refresh.email, TokenType::Access);
    create_token(&access, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_lifetimes() {
        assert_eq!(TokenType::Access.lifetime(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.lifetime(), Duration::days(30));
    }

    #[test]
    fn test_create_and_validate() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ada@example.com", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let claims = Claims::new(Uuid::new_v4(), "a@b.c", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, "another-secret-key-of-32-bytes-len"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::with_lifetime(
            Uuid::new_v4(),
            "a@b.c",
            TokenType::Access,
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());
        assert_eq!(claims.expires_in(), 0);

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let user_id = Uuid::new_v4();
        let pair = issue_token_pair(user_id, "a@b.c", SECRET).unwrap();

        assert!(matches!(
            validate_access_token(&pair.refresh_token, SECRET),
            Err(JwtError::WrongType { expected: "access" })
        ));
        assert!(matches!(
            refresh_access_token(&pair.access_token, SECRET),
            Err(JwtError::WrongType { expected: "refresh" })
        ));
    }

    #[test]
    fn test_refresh_issues_access_token() {
        let user_id = Uuid::new_v4();
        let pair = issue_token_pair(user_id, "a@b.c", SECRET).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert!(pair.expires_in > 23 * 3600);

        let access = refresh_access_token(&pair.refresh_token, SECRET).unwrap();
        let claims = validate_access_token(&access, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TokenType::Access);
    }
}
