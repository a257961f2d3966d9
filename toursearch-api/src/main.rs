use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use toursearch_api::{app, AppState};
use toursearch_store::{app_config::Config, seed, DbClient, PostgresTourRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toursearch_api=debug,toursearch_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tour Search on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let tours = Arc::new(PostgresTourRepository::new(db.pool.clone()));

    if let Some(path) = &config.seed.path {
        seed::import_file(&*tours, path)
            .await
            .with_context(|| format!("Failed to seed tours from {}", path))?;
    }

    let state = AppState::new(tours, config.listing.per_page).context("Failed to compile templates")?;
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
