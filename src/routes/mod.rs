// ABOUTME: HTTP API surface: health, sync trigger, and tool invocation routes
// ABOUTME: Handlers stay thin; auth and status mapping happen here, logic lives below
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

/// Liveness endpoint
pub mod health;
/// Sync trigger endpoint
pub mod sync;
/// Tool invocation endpoint
pub mod tools;

use crate::resources::ServerResources;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/sync", post(sync::trigger_sync))
        .route("/api/tools/call", post(tools::call_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(resources)
}
