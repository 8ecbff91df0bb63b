/// Schema migrations
///
/// SQL files in the workspace `migrations/` directory are compiled into the
/// binary. Each change is an `{version}_{name}.up.sql` file with a matching
/// `.down.sql`.
///
/// # Example
///
/// ```no_run
/// use askboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use askboard_shared::db::migrations::{get_migration_status, run_migrations};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///
/// run_migrations(&pool).await?;
/// let status = get_migration_status(&pool).await?;
/// assert_eq!(status.pending, 0);
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{debug, error, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applied versus embedded migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_migrations: usize,

    /// Highest successfully applied version
    pub latest_version: Option<i64>,

    /// Embedded migrations not yet applied
    pub pending: usize,
}

/// Applies every pending migration; applied ones are skipped
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(embedded = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Reads applied versions from the `_sqlx_migrations` bookkeeping table
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let embedded: Vec<i64> = MIGRATOR
        .iter()
        .filter(|m| m.migration_type.is_up_migration())
        .map(|m| m.version)
        .collect();

    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;

    let applied: Vec<i64> = if tracked {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(pool)
            .await?
    } else {
        Vec::new()
    };

    let status = MigrationStatus {
        applied_migrations: applied.len(),
        latest_version: applied.last().copied(),
        pending: embedded.iter().filter(|v| !applied.contains(v)).count(),
    };

    debug!(?status, "Migration status");
    Ok(status)
}

/// Creates the database named in `database_url` when it is missing
///
/// For development and test setups.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Creating database");
    Postgres::create_database(database_url).await
}

/// Drops the database named in `database_url` if it exists
///
/// All connections to it must be closed first.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        warn!("Dropping database");
        Postgres::drop_database(database_url).await?;
    }

    Ok(())
}
