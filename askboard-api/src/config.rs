/// Configuration for the API server
///
/// Loaded from environment variables, with a `.env` file honored in
/// development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: enables HSTS and `Secure` cookies (default: false)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `SESSION_COOKIE_NAME`: name of the session cookie (default: askboard_session)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use askboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode: HSTS and secure cookies
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 characters. Generate with `openssl rand -hex 32`.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Cookie carrying the access token for browser sessions
    pub session_cookie_name: String,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value does not
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let production = env::var("PRODUCTION").map(|v| parse_bool(&v)).unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let session_cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "askboard_session".to_string());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                session_cookie_name,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
