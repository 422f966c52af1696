// ABOUTME: Sync trigger route guarded by the shared scheduler secret
// ABOUTME: An unconfigured secret is a server fault, never an open door
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// Optional sync trigger body
#[derive(Debug, Deserialize)]
pub struct SyncTriggerRequest {
    /// Restrict the pass to one tenant
    pub tenant_id: Option<String>,
}

/// `POST /api/sync` — run a sync pass for every enabled connection
///
/// Authenticated with the shared `SYNC_TRIGGER_SECRET`, not a tenant JWT;
/// the caller is a scheduler, not a tenant. Returns 502 when every
/// attempted tenant failed, 200 otherwise.
pub async fn trigger_sync(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = authorize(&resources, &headers) {
        return e.into_response();
    }

    let tenant_id = match parse_body(&body) {
        Ok(scope) => scope,
        Err(e) => return e.into_response(),
    };

    match resources.sync.run(tenant_id.as_deref()).await {
        Ok(summary) => {
            let status = if summary.all_failed() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            (status, Json(summary)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

fn authorize(resources: &ServerResources, headers: &HeaderMap) -> AppResult<()> {
    let Some(secret) = resources.config.sync_trigger_secret.as_deref() else {
        return Err(AppError::config(
            "SYNC_TRIGGER_SECRET is not configured; sync triggering is disabled",
        ));
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::auth_required("Missing authorization header"))?;
    let token = presented
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Authorization header must use Bearer scheme"))?;

    if token != secret {
        return Err(AppError::auth_invalid("Invalid sync trigger secret"));
    }
    Ok(())
}

/// An empty body means an unscoped pass; anything else must be valid JSON
fn parse_body(body: &Bytes) -> AppResult<Option<String>> {
    if body.is_empty() {
        return Ok(None);
    }
    let request: SyncTriggerRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid sync request body: {e}")))?;
    Ok(request.tenant_id.filter(|t| !t.is_empty()))
}
