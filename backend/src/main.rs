//! Asset Recovery Finance - settlement engine server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use asset_recovery_backend::{
    config::{Config, StoreBackend},
    create_app,
    store::{FinanceStore, MemoryFinanceStore, PgFinanceStore},
    AppState,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arf_server=debug,asset_recovery_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    config.validate()?;

    tracing::info!("Starting Asset Recovery Finance Server");
    tracing::info!("Environment: {}", config.environment);

    let store = init_store(&config).await?;

    // Create application state
    let state = AppState::new(store, config.clone());

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connect the configured store backend
async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn FinanceStore>> {
    let prefix = config.finance.settlement_prefix.clone();

    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryFinanceStore::new(prefix)))
        }
        StoreBackend::Postgres => {
            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgFinanceStore::new(db_pool, prefix)))
        }
    }
}
