// ABOUTME: Tool registry and execution context for the unified query surface
// ABOUTME: Tools are tenant-scoped; the caller's identity decides what they can see
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

/// Fleet vehicle and location search tools
pub mod fleet;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Hard ceiling on tool result counts
pub const MAX_LIMIT: i64 = 100;
/// Result count when the caller does not ask for one
pub const DEFAULT_LIMIT: i64 = 20;

/// Per-call execution context derived from the authenticated request
pub struct ToolContext {
    /// Tenant whose data the call may see
    pub tenant_id: String,
    /// Shared database handle
    pub database: Arc<Database>,
    /// Hours after which a row is tagged stale
    pub stale_after_hours: i64,
}

/// One callable query tool
#[async_trait]
pub trait FleetTool: Send + Sync {
    /// Stable tool name used for dispatch
    fn name(&self) -> &'static str;

    /// Human-readable description surfaced in tool listings
    fn description(&self) -> &'static str;

    /// Execute the tool with JSON arguments
    ///
    /// # Errors
    ///
    /// Returns an error for invalid arguments or database failures.
    async fn call(&self, ctx: &ToolContext, args: &Value) -> AppResult<Value>;
}

/// Registry of available tools, dispatched by name
pub struct ToolRegistry {
    tools: Vec<Arc<dyn FleetTool>>,
}

impl ToolRegistry {
    /// Build the registry with every shipped tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: vec![
                Arc::new(fleet::SearchFleetVehiclesTool),
                Arc::new(fleet::SearchFleetLocationsTool),
            ],
        }
    }

    /// Names and descriptions of every registered tool
    #[must_use]
    pub fn list(&self) -> Vec<(&'static str, &'static str)> {
        self.tools
            .iter()
            .map(|t| (t.name(), t.description()))
            .collect()
    }

    /// Dispatch a call to the named tool
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown tool name, otherwise
    /// whatever the tool itself returns.
    pub async fn call(&self, name: &str, ctx: &ToolContext, args: &Value) -> AppResult<Value> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| AppError::not_found(format!("Tool '{name}'")))?;
        tool.call(ctx, args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a requested result count into the allowed range
pub(crate) fn clamp_limit(args: &Value) -> i64 {
    args.get("limit")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}
