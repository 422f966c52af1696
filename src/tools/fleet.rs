// ABOUTME: Cross-provider fleet search tools: vehicles and current locations
// ABOUTME: Per-provider query results are merged, sorted by fix recency, and truncated here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use crate::models::{
    CompositeId, LocationSearchRow, ProviderFilter, VehicleSearchRow,
};
use crate::tools::{clamp_limit, FleetTool, ToolContext};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::cmp::Ordering;

/// Search canonical vehicles across providers
pub struct SearchFleetVehiclesTool;

/// Search canonical current locations across providers
pub struct SearchFleetLocationsTool;

fn provider_filter(args: &Value) -> AppResult<ProviderFilter> {
    args.get("provider")
        .and_then(Value::as_str)
        .unwrap_or("all")
        .parse()
}

fn free_text(args: &Value) -> Option<&str> {
    args.get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
}

fn is_stale(last_synced_at: DateTime<Utc>, stale_after_hours: i64) -> bool {
    last_synced_at < Utc::now() - Duration::hours(stale_after_hours)
}

/// Descending by fix time; rows without a fix sort last
fn by_recency_desc(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn vehicle_json(row: &VehicleSearchRow, stale_after_hours: i64) -> Value {
    let composite = CompositeId::new(row.provider, row.native_vehicle_id.clone());
    json!({
        "vehicle_id": composite.to_string(),
        "provider": row.provider,
        "native_vehicle_id": row.native_vehicle_id,
        "name": row.name,
        "license_plate": row.license_plate,
        "vin": row.vin,
        "make": row.make,
        "model": row.model,
        "year": row.year,
        "status": row.status,
        "availability_status": row.availability_status,
        "location": row.location,
        "stale": is_stale(row.last_synced_at, stale_after_hours),
        "last_synced_at": row.last_synced_at,
    })
}

fn location_json(row: &LocationSearchRow, stale_after_hours: i64) -> Value {
    let composite = CompositeId::new(row.provider, row.native_vehicle_id.clone());
    json!({
        "vehicle_id": composite.to_string(),
        "provider": row.provider,
        "native_vehicle_id": row.native_vehicle_id,
        "latitude": row.latitude,
        "longitude": row.longitude,
        "heading": row.heading,
        "speed": row.speed,
        "odometer": row.odometer,
        "engine_hours": row.engine_hours,
        "fuel_percent": row.fuel_percent,
        "battery_voltage": row.battery_voltage,
        "ignition_on": row.ignition_on,
        "moving": row.moving,
        "located_at": row.located_at,
        "stale": is_stale(row.last_synced_at, stale_after_hours),
        "last_synced_at": row.last_synced_at,
    })
}

fn envelope(tenant_id: &str, results: Vec<Value>) -> Value {
    json!({
        "ok": true,
        "tenant_id": tenant_id,
        "count": results.len(),
        "results": results,
    })
}

#[async_trait]
impl FleetTool for SearchFleetVehiclesTool {
    fn name(&self) -> &'static str {
        "search_fleet_vehicles"
    }

    fn description(&self) -> &'static str {
        "Search vehicles across all connected telematics providers, with current location when known"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> AppResult<Value> {
        let filter = provider_filter(args)?;
        let limit = clamp_limit(args);
        let query = free_text(args);

        let mut rows: Vec<VehicleSearchRow> = Vec::new();
        for kind in filter.kinds() {
            rows.extend(
                ctx.database
                    .search_vehicles(&ctx.tenant_id, kind, query, limit)
                    .await?,
            );
        }

        rows.sort_by(|a, b| {
            by_recency_desc(
                a.location.as_ref().map(|l| l.located_at),
                b.location.as_ref().map(|l| l.located_at),
            )
        });
        rows.truncate(limit as usize);

        let results = rows
            .iter()
            .map(|r| vehicle_json(r, ctx.stale_after_hours))
            .collect();
        Ok(envelope(&ctx.tenant_id, results))
    }
}

#[async_trait]
impl FleetTool for SearchFleetLocationsTool {
    fn name(&self) -> &'static str {
        "search_fleet_locations"
    }

    fn description(&self) -> &'static str {
        "Search current vehicle locations across providers, newest fix first"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> AppResult<Value> {
        let limit = clamp_limit(args);
        let query = free_text(args);

        // A composite vehicle id pins the search to exactly one provider row;
        // a bare native id matches it on every selected provider.
        let mut rows: Vec<LocationSearchRow> = Vec::new();
        if let Some(raw_id) = args.get("vehicle_id").and_then(Value::as_str) {
            if raw_id.contains(':') {
                let composite: CompositeId = raw_id.parse().map_err(|e: AppError| {
                    AppError::invalid_input(format!("Invalid vehicle_id: {}", e.message))
                })?;
                rows.extend(
                    ctx.database
                        .search_locations(
                            &ctx.tenant_id,
                            composite.provider,
                            Some(&composite.native_id),
                            None,
                            limit,
                        )
                        .await?,
                );
            } else {
                let filter = provider_filter(args)?;
                for kind in filter.kinds() {
                    rows.extend(
                        ctx.database
                            .search_locations(&ctx.tenant_id, kind, Some(raw_id), None, limit)
                            .await?,
                    );
                }
            }
        } else {
            let filter = provider_filter(args)?;
            for kind in filter.kinds() {
                rows.extend(
                    ctx.database
                        .search_locations(&ctx.tenant_id, kind, None, query, limit)
                        .await?,
                );
            }
        }

        rows.sort_by(|a, b| by_recency_desc(Some(a.located_at), Some(b.located_at)));
        rows.truncate(limit as usize);

        let results = rows
            .iter()
            .map(|r| location_json(r, ctx.stale_after_hours))
            .collect();
        Ok(envelope(&ctx.tenant_id, results))
    }
}
