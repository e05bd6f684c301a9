use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use people_enrichment_api::config::Config;
use people_enrichment_api::db::Database;
use people_enrichment_api::db_storage::HumanStorage;
use people_enrichment_api::enrichment::Enricher;
use people_enrichment_api::handlers::AppState;
use people_enrichment_api::routes::build_router;

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool and the lookup
/// clients, then serves the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "people_enrichment_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Lookup clients are built once and shared by every request
    let enricher = Enricher::from_config(&config)?;
    tracing::info!(
        "✓ Lookup clients initialized (timeout {:?}): {}, {}, {}",
        enricher.timeout(),
        config.agify_url,
        config.genderize_url,
        config.nationalize_url
    );

    let app_state = Arc::new(AppState {
        storage: HumanStorage::new(db.pool.clone()),
        enricher,
    });

    let app = build_router(app_state)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
