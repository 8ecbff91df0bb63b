/// PostgreSQL connection pool
///
/// One pool is built at startup and cloned into every handler. Creation
/// fails fast: the pool is pinged before it is returned, so the server never
/// starts against a database it cannot reach.
///
/// # Example
///
/// ```no_run
/// use askboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig::new("postgresql://localhost/askboard")).await?;
///
/// let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
///     .fetch_one(&pool)
///     .await?;
/// println!("{questions} questions");
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Pool settings; durations are whole seconds
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,

    /// Connections kept open while idle
    pub min_connections: u32,

    /// How long a request waits for a free connection
    pub connect_timeout_seconds: u64,

    /// `None` keeps idle connections forever
    pub idle_timeout_seconds: Option<u64>,

    /// `None` never recycles a connection
    pub max_lifetime_seconds: Option<u64>,

    /// Ping each connection when it is checked out
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

impl DatabaseConfig {
    /// Default settings for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.connect_timeout_seconds))
            .idle_timeout(self.idle_timeout_seconds.map(Duration::from_secs))
            .max_lifetime(self.max_lifetime_seconds.map(Duration::from_secs))
            .test_before_acquire(self.test_before_acquire)
    }
}

/// Opens the pool and checks that the database answers
///
/// # Errors
///
/// Fails on a malformed URL, an unreachable server or a failed ping.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        idle_timeout_seconds = ?config.idle_timeout_seconds,
        max_lifetime_seconds = ?config.max_lifetime_seconds,
        "Opening database pool"
    );

    let pool = config.pool_options().connect(&config.url).await?;
    health_check(&pool).await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Round-trips `SELECT 1` through the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;

    if one != 1 {
        return Err(sqlx::Error::Protocol(format!("ping returned {one}")));
    }
    Ok(())
}

/// Point-in-time pool usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Open connections
    pub size: u32,
    pub idle: usize,
    pub in_use: usize,
}

pub fn get_pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle();

    PoolStats {
        size,
        idle,
        in_use: (size as usize).saturating_sub(idle),
    }
}

/// Closes the pool once checked-out connections come back
pub async fn close_pool(pool: PgPool) {
    pool.close().await;
    info!("Database pool closed");
}
