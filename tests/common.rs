// ABOUTME: Shared test utilities: in-memory database, stub provider servers, seed helpers
// ABOUTME: Reduces duplication across the sync, audit, and query tool integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(dead_code)]

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use fleetsync::config::ServerConfig;
use fleetsync::database::Database;
use fleetsync::models::{NewLocation, NewVehicle, ProviderKind};
use fleetsync::providers;
use fleetsync::resources::ServerResources;
use fleetsync::sync::SyncOrchestrator;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Fresh in-memory database with migrations applied
pub async fn create_test_database() -> Arc<Database> {
    Arc::new(Database::new("sqlite::memory:").await.unwrap())
}

/// Server config pointing provider adapters at stub base URLs
pub fn test_config(samsara_api_base: &str, motive_api_base: &str) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        jwt_secret: "test-jwt-secret".to_owned(),
        sync_trigger_secret: Some("test-sync-secret".to_owned()),
        samsara_api_base: samsara_api_base.to_owned(),
        motive_api_base: motive_api_base.to_owned(),
        stale_after_hours: 24,
        sync_run_ttl_minutes: 15,
    }
}

/// Full server resources over an existing database
pub fn create_test_resources(config: ServerConfig, database: Arc<Database>) -> Arc<ServerResources> {
    Arc::new(ServerResources::new(config, database))
}

/// Orchestrator wired to stub provider base URLs
pub fn create_test_orchestrator(
    database: Arc<Database>,
    samsara_api_base: &str,
    motive_api_base: &str,
) -> SyncOrchestrator {
    SyncOrchestrator::new(
        database,
        reqwest::Client::new(),
        providers::registry(samsara_api_base, motive_api_base),
        15,
    )
}

/// Insert a tenant connection row directly
pub async fn seed_connection(
    database: &Database,
    tenant_id: &str,
    provider: ProviderKind,
    enabled: bool,
) {
    sqlx::query(
        "INSERT INTO tenant_connections (id, tenant_id, provider, access_token, enabled, sandbox, created_at) \
         VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(tenant_id)
    .bind(provider.as_str())
    .bind(format!("token-{tenant_id}"))
    .bind(i64::from(enabled))
    .bind(Utc::now().to_rfc3339())
    .execute(database.pool())
    .await
    .unwrap();
}

/// Minimal canonical vehicle for direct upsert tests
pub fn sample_vehicle(native_id: &str, name: &str) -> NewVehicle {
    NewVehicle {
        native_vehicle_id: native_id.to_owned(),
        name: Some(name.to_owned()),
        license_plate: None,
        license_plate_state: None,
        vin: None,
        make: None,
        model: None,
        year: None,
        status: None,
        availability_status: None,
        raw: json!({"id": native_id, "name": name}),
    }
}

/// Minimal canonical location for direct upsert tests
pub fn sample_location(native_id: &str, lat: f64, lon: f64) -> NewLocation {
    NewLocation {
        native_vehicle_id: native_id.to_owned(),
        latitude: lat,
        longitude: lon,
        heading: None,
        speed: None,
        odometer: None,
        engine_hours: None,
        fuel_percent: None,
        battery_voltage: None,
        ignition_on: None,
        moving: None,
        located_at: Utc::now(),
        raw: json!({"id": native_id, "lat": lat, "lon": lon}),
    }
}

/// Serve a router on an ephemeral port and return its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Router serving a fixed JSON body at each path
pub fn fixed_json_router(routes: Vec<(&'static str, Value)>) -> Router {
    let mut router = Router::new();
    for (path, body) in routes {
        router = router.route(
            path,
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
    }
    router
}

/// Router returning the given status for every request
pub fn failing_router(status: axum::http::StatusCode) -> Router {
    Router::new().fallback(move || async move { (status, "stub failure") })
}
