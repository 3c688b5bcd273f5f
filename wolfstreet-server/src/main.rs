mod ingest;
mod mailer;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wolfstreet_core::Store;
use wolfstreet_core::config::AppConfig;
use wolfstreet_provider_outlook::{OutlookAppConfig, OutlookService};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    let store = Store::open(&config.database_path())?;

    let outlook_config = OutlookAppConfig::load()?;
    if outlook_config.is_none() {
        tracing::warn!("Outlook credentials not found, outlook-calendar will report not_configured");
    }

    let addr = config.server.bind_address();
    let state = AppState::new(Arc::new(config), Arc::new(store), OutlookService::new(outlook_config));
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("wolfstreet-server listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
