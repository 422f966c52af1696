// ABOUTME: Liveness route reporting server and database health
// ABOUTME: A failed ping surfaces as a database error rather than a fake healthy response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::AppResult;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// `GET /api/health` — verify the server and database are reachable
///
/// # Errors
///
/// Returns a `DatabaseError` response when the ping fails.
pub async fn health(State(resources): State<Arc<ServerResources>>) -> AppResult<Json<Value>> {
    resources.database.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "database": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
