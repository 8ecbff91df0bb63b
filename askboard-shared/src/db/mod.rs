/// Database layer for Askboard
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
/// - `errors`: classification of constraint violations
///
/// Row models live in the crate-level `models` module.

pub mod errors;
pub mod migrations;
pub mod pool;
