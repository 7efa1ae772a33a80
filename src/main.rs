use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use survey_designer::core::config::{AppPaths, ConfigService};
use survey_designer::core::logging;
use survey_designer::server;
use survey_designer::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let config = ConfigService::new(paths.clone());
    let settings = config.load_settings().with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config.config_path().display()
        )
    })?;

    logging::init(&paths, settings.server.debug);
    tracing::debug!("Loaded settings: {:?}", settings);

    let settings = Arc::new(settings);
    let state = AppState::initialize(settings.clone()).await;

    let bind_addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
