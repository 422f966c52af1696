// ABOUTME: FleetSync server entry point: config, database, router, serve
// ABOUTME: Fails fast on missing required configuration before binding the port
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use fleetsync::config::ServerConfig;
use fleetsync::database::Database;
use fleetsync::errors::{AppError, AppResult};
use fleetsync::resources::ServerResources;
use fleetsync::routes;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fleetsync=info,tower_http=warn")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let database = Arc::new(Database::new(&config.database_url).await?);
    info!(port = config.http_port, "Starting FleetSync server");

    let resources = Arc::new(ServerResources::new(config.clone(), database));
    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port))
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind port {}: {e}", config.http_port)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;
    Ok(())
}
