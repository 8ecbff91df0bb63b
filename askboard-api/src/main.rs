//! # Askboard API Server
//!
//! Q&A board backend: users ask questions, answer them, tag them and like
//! questions and answers.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/askboard JWT_SECRET=... cargo run -p askboard-api
//! ```

use askboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use askboard_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askboard_api=debug,askboard_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Askboard API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
