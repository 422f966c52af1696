// ABOUTME: Tool invocation route: JWT-authenticated, tenant scope from the token
// ABOUTME: Tool-level failures come back as 200 envelopes so callers can read them uniformly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::ErrorCode;
use crate::resources::ServerResources;
use crate::tools::ToolContext;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool invocation request body
#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    /// Tool name to invoke
    pub tool: String,
    /// Tool arguments; defaults to an empty object
    #[serde(default)]
    pub args: Value,
}

/// `POST /api/tools/call` — invoke a query tool as the authenticated tenant
pub async fn call_tool(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    Json(request): Json<ToolCallRequest>,
) -> Response {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = match resources.auth.authenticate_header(auth_header) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let ctx = ToolContext {
        tenant_id: claims.sub,
        database: Arc::clone(&resources.database),
        stale_after_hours: resources.config.stale_after_hours,
    };

    let args = if request.args.is_null() {
        json!({})
    } else {
        request.args
    };

    match resources.tools.call(&request.tool, &ctx, &args).await {
        Ok(result) => Json(result).into_response(),
        // An unknown tool is a routing error; everything else is a result
        // the caller should be able to inspect without special-casing 4xx.
        Err(e) if e.code == ErrorCode::ResourceNotFound => e.into_response(),
        Err(e) => Json(json!({
            "ok": false,
            "error": e.message,
            "code": e.code.as_str(),
        }))
        .into_response(),
    }
}
