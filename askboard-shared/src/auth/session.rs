/// Request authentication
///
/// A request is authenticated by an access token, taken from the
/// `Authorization: Bearer <token>` header or, failing that, from the session
/// cookie set at login. Browsers use the cookie; API clients use the header.
///
/// # Example
///
/// ```
/// use askboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use askboard_shared::auth::session::authenticate;
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-key-of-at-least-32-bytes!!";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, "ada@example.com", TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_str(&format!("askboard_session={token}"))?);
///
/// let actor = authenticate(&headers, "askboard_session", secret)?;
/// assert_eq!(actor.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Neither a bearer token nor a session cookie was sent
    #[error("Authentication required")]
    MissingCredentials,

    /// Authorization header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Session expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Finds the access token in a request, header first
pub fn extract_token<'a>(
    headers: &'a HeaderMap,
    cookie_name: &str,
) -> Result<Option<&'a str>, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;
        return Ok(Some(token));
    }

    Ok(cookie_value(headers, cookie_name))
}

/// Value of the named cookie across all `Cookie` headers
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Authenticates a request, failing if no valid access token is present
pub fn authenticate(
    headers: &HeaderMap,
    cookie_name: &str,
    secret: &str,
) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers, cookie_name)?.ok_or(AuthError::MissingCredentials)?;
    let claims = validate_access_token(token, secret)?;
    Ok(claims.into())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const COOKIE: &str = "askboard_session";

    fn token_for(user_id: Uuid, token_type: TokenType) -> String {
        create_token(&Claims::new(user_id, "ada@example.com", token_type), SECRET).unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token_for(user_id, TokenType::Access))).unwrap(),
        );

        let actor = authenticate(&headers, COOKIE, SECRET).unwrap();
        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.email, "ada@example.com");
    }

    #[test]
    fn test_cookie_among_others() {
        let user_id = Uuid::new_v4();
        let token = token_for(user_id, TokenType::Access);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {COOKIE}={token}; lang=en")).unwrap(),
        );

        assert_eq!(extract_token(&headers, COOKIE).unwrap(), Some(token.as_str()));
        assert_eq!(authenticate(&headers, COOKIE, SECRET).unwrap().user_id, user_id);
    }

    #[test]
    fn test_missing_credentials() {
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&headers, COOKIE, SECRET),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_token(&headers, COOKIE),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_refresh_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token_for(Uuid::new_v4(), TokenType::Refresh)))
                .unwrap(),
        );
        assert!(matches!(
            authenticate(&headers, COOKIE, SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie(COOKIE, "abc", 3600, true);
        assert_eq!(
            cookie,
            "askboard_session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600; Secure"
        );

        let cleared = clear_session_cookie(COOKIE, false);
        assert!(cleared.starts_with("askboard_session=; "));
        assert!(cleared.contains("Max-Age=0"));
        assert!(!cleared.contains("Secure"));
    }
}
