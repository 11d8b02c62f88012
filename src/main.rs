//! Book Tracker Server
//!
//! REST API server for a personal reading list.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booktracker::{
    api,
    config::AppConfig,
    repository::{self, book_migrations, Migrator, SqliteBookStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("booktracker={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Book Tracker v{}", env!("CARGO_PKG_VERSION"));

    let pool = repository::connect(&config.database)
        .await
        .context("Failed to open database")?;

    tracing::info!("Connected to database {}", config.database.path);

    let applied = Migrator::new(pool.clone(), book_migrations())
        .apply_pending()
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed ({} applied)", applied);

    let services = Services::new(Arc::new(SqliteBookStore::new(pool)));

    if config.database.seed {
        services
            .books
            .seed_if_empty()
            .await
            .context("Failed to seed initial data")?;
    }

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
