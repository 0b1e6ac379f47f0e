use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use chillsite::api;
use chillsite::auth::AuthService;
use chillsite::config::{Config, DatabaseBackend, VisitGranularity};
use chillsite::storage::{PostgresStore, RecordStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the record store
    let store: Arc<dyn RecordStore> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite record store: {}", config.database.url);
            Arc::new(SqliteStore::new(&config.database.url).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL record store: {}", config.database.url);
            Arc::new(PostgresStore::new(&config.database.url).await?)
        }
    };

    info!("Initializing record store...");
    store.init().await?;
    info!("Record store initialized successfully");

    let auth_service = Arc::new(AuthService::new(config.auth.clone()));

    match config.analytics.visit_granularity {
        VisitGranularity::Session => info!(
            "Visit tracking: one visit per session per {}-minute idle window",
            config.analytics.session_idle_minutes
        ),
        VisitGranularity::Pageload => info!("Visit tracking: one visit per page load"),
    }
    info!(
        "Analytics reporting zone: UTC{:+}",
        config.analytics.utc_offset_hours
    );

    let router = api::create_router(
        Arc::clone(&store),
        auth_service,
        config.analytics.clone(),
        config.frontend.clone(),
    );

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    } else {
        info!("🎨 Serving embedded frontend");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Public API at http://{}/api/...", addr);
    info!("   - Marketing site at http://{}/", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
