// ABOUTME: Integration tests for the full sync pipeline against stub provider servers
// ABOUTME: Covers happy paths, skip counting, pagination, failure isolation, and idempotence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use common::{
    create_test_database, create_test_orchestrator, failing_router, fixed_json_router,
    seed_connection, spawn_stub,
};
use fleetsync::models::{ProviderKind, SyncRunStatus};
use serde_json::{json, Value};
use std::collections::HashMap;

fn samsara_happy_router() -> Router {
    fixed_json_router(vec![
        (
            "/fleet/vehicles",
            json!({
                "data": [
                    {"id": "100", "name": "Truck 1", "vin": "VIN100", "make": "Ford"},
                    {"id": "101", "name": "Truck 2", "licensePlate": "ABC123"}
                ],
                "pagination": {"hasNextPage": false}
            }),
        ),
        (
            "/fleet/vehicles/locations",
            json!({
                "data": [
                    {"id": "100", "location": {
                        "latitude": 37.77, "longitude": -122.41,
                        "time": "2026-02-10T08:30:00Z", "speed": 40.0
                    }}
                ],
                "pagination": {"hasNextPage": false}
            }),
        ),
    ])
}

#[tokio::test]
async fn samsara_sync_persists_vehicles_and_locations() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;
    let base = spawn_stub(samsara_happy_router()).await;
    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);

    let summary = orchestrator.run(None).await.unwrap();
    assert!(summary.ok);
    assert_eq!(summary.total_tenants, 1);
    assert_eq!(summary.total_synced, 3);
    assert_eq!(summary.total_skipped, 0);

    let vehicles = db
        .search_vehicles("tenant-a", ProviderKind::Samsara, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 2);

    let locations = db
        .search_locations("tenant-a", ProviderKind::Samsara, None, None, 50)
        .await
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].native_vehicle_id, "100");

    let runs = db.list_sync_runs("tenant-a", 10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, SyncRunStatus::Success);
    assert_eq!(runs[0].total_count, Some(3));
    assert_eq!(runs[0].pagination_param.as_deref(), Some("after"));
    assert!(runs[0].finished_at.is_some());
}

#[tokio::test]
async fn skipped_records_are_counted_not_stored() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;

    let base = spawn_stub(fixed_json_router(vec![
        (
            "/fleet/vehicles",
            json!({"data": [
                {"id": "200", "name": "Good"},
                {"name": "No id at all"}
            ]}),
        ),
        (
            "/fleet/vehicles/locations",
            json!({"data": [
                {"id": "200", "location": {"latitude": 1.0, "longitude": 2.0}},
                {"location": {"latitude": 3.0, "longitude": 4.0}},
                {"id": "201", "location": {"latitude": 5.0}}
            ]}),
        ),
    ]))
    .await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    let summary = orchestrator.run(None).await.unwrap();

    assert_eq!(summary.total_synced, 2);
    assert_eq!(summary.total_skipped, 3);

    let runs = db.list_sync_runs("tenant-a", 10).await.unwrap();
    assert_eq!(runs[0].skipped_without_id, Some(2));
    assert_eq!(runs[0].skipped_without_lat_lon, Some(1));

    // Nothing partial reached the store.
    let locations = db
        .search_locations("tenant-a", ProviderKind::Samsara, None, None, 50)
        .await
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].native_vehicle_id, "200");
}

#[tokio::test]
async fn no_enabled_connections_is_a_no_op() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, false).await;

    let orchestrator = create_test_orchestrator(db.clone(), "http://127.0.0.1:1", "http://127.0.0.1:1");
    let summary = orchestrator.run(None).await.unwrap();

    assert!(summary.ok);
    assert_eq!(summary.message.as_deref(), Some("no enabled connections"));
    assert_eq!(summary.total_tenants, 0);
    assert!(db.list_sync_runs("tenant-a", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_is_isolated_per_tenant() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;
    seed_connection(&db, "tenant-b", ProviderKind::Motive, true).await;

    let samsara_base = spawn_stub(samsara_happy_router()).await;
    let motive_base = spawn_stub(failing_router(StatusCode::INTERNAL_SERVER_ERROR)).await;

    let orchestrator = create_test_orchestrator(db.clone(), &samsara_base, &motive_base);
    let summary = orchestrator.run(None).await.unwrap();

    assert!(summary.ok);
    assert_eq!(summary.total_tenants, 2);
    let failed = summary
        .results
        .iter()
        .find(|r| r.tenant_id == "tenant-b")
        .unwrap();
    assert!(failed.error.as_deref().unwrap().contains("500"));

    // The healthy tenant's data landed despite the neighbor's failure.
    let vehicles = db
        .search_vehicles("tenant-a", ProviderKind::Samsara, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 2);

    let runs = db.list_sync_runs("tenant-b", 10).await.unwrap();
    assert_eq!(runs[0].status, SyncRunStatus::Error);
    assert!(runs[0].error_message.is_some());
}

#[tokio::test]
async fn all_failures_mark_summary_not_ok() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;

    let base = spawn_stub(failing_router(StatusCode::SERVICE_UNAVAILABLE)).await;
    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    let summary = orchestrator.run(None).await.unwrap();

    assert!(!summary.ok);
    assert!(summary.all_failed());
}

#[tokio::test]
async fn second_sync_is_idempotent() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;
    let base = spawn_stub(samsara_happy_router()).await;
    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);

    orchestrator.run(None).await.unwrap();
    let second = orchestrator.run(None).await.unwrap();
    assert_eq!(second.total_synced, 3);

    let vehicles = db
        .search_vehicles("tenant-a", ProviderKind::Samsara, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 2);

    // Each pass leaves its own audit row.
    let runs = db.list_sync_runs("tenant-a", 10).await.unwrap();
    assert_eq!(runs.len(), 2);
}

#[tokio::test]
async fn scoped_sync_only_touches_the_named_tenant() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;
    seed_connection(&db, "tenant-b", ProviderKind::Samsara, true).await;
    let base = spawn_stub(samsara_happy_router()).await;
    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);

    let summary = orchestrator.run(Some("tenant-b")).await.unwrap();
    assert_eq!(summary.total_tenants, 1);
    assert_eq!(summary.results[0].tenant_id, "tenant-b");
    assert!(db.list_sync_runs("tenant-a", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn motive_unwraps_named_envelopes_and_item_wrappers() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-m", ProviderKind::Motive, true).await;

    let base = spawn_stub(fixed_json_router(vec![
        (
            "/v1/vehicles",
            json!({
                "vehicles": [
                    {"vehicle": {"id": 618923, "number": "Unit 44", "vin": "VINM1"}}
                ],
                "pagination": {"per_page": 100, "page_no": 1, "total": 1}
            }),
        ),
        (
            "/v1/vehicle_locations",
            json!({
                "vehicle_locations": [
                    {"vehicle": {"id": 618923, "current_location": {
                        "lat": "29.76", "lon": "-95.36",
                        "located_at": "2026-02-10T08:30:00Z"
                    }}}
                ],
                "pagination": {"per_page": 100, "page_no": 1, "total": 1}
            }),
        ),
    ]))
    .await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    let summary = orchestrator.run(None).await.unwrap();
    assert_eq!(summary.total_synced, 2);

    let vehicles = db
        .search_vehicles("tenant-m", ProviderKind::Motive, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].native_vehicle_id, "618923");
    assert_eq!(vehicles[0].name.as_deref(), Some("Unit 44"));

    // String-typed coordinates are coerced on the way in.
    let locations = db
        .search_locations("tenant-m", ProviderKind::Motive, None, None, 50)
        .await
        .unwrap();
    assert!((locations[0].latitude - 29.76).abs() < f64::EPSILON);

    let runs = db.list_sync_runs("tenant-m", 10).await.unwrap();
    assert_eq!(runs[0].pagination_param.as_deref(), Some("page_no"));
}

#[tokio::test]
async fn samsara_cursor_pagination_walks_all_pages() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;

    async fn vehicles(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        match params.get("after").map(String::as_str) {
            None => Json(json!({
                "data": [{"id": "300", "name": "Page one"}],
                "pagination": {"endCursor": "c1", "hasNextPage": true}
            })),
            Some("c1") => Json(json!({
                "data": [{"id": "301", "name": "Page two"}],
                "pagination": {"endCursor": "", "hasNextPage": false}
            })),
            Some(other) => panic!("unexpected cursor {other}"),
        }
    }

    let router = Router::new()
        .route("/fleet/vehicles", get(vehicles))
        .route(
            "/fleet/vehicles/locations",
            get(|| async { Json(json!({"data": [], "pagination": {"hasNextPage": false}})) }),
        );
    let base = spawn_stub(router).await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    orchestrator.run(None).await.unwrap();

    let vehicles = db
        .search_vehicles("tenant-a", ProviderKind::Samsara, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 2);
}

#[tokio::test]
async fn samsara_repeating_cursor_terminates_the_walk() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;

    // Always claims another page behind the same cursor.
    let router = Router::new()
        .route(
            "/fleet/vehicles",
            get(|| async {
                Json(json!({
                    "data": [{"id": "400", "name": "Stuck"}],
                    "pagination": {"endCursor": "stuck", "hasNextPage": true}
                }))
            }),
        )
        .route(
            "/fleet/vehicles/locations",
            get(|| async { Json(json!({"data": [], "pagination": {"hasNextPage": false}})) }),
        );
    let base = spawn_stub(router).await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    let summary = orchestrator.run(None).await.unwrap();
    assert!(summary.ok);

    let vehicles = db
        .search_vehicles("tenant-a", ProviderKind::Samsara, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].native_vehicle_id, "400");
}

#[tokio::test]
async fn motive_page_pagination_respects_reported_total() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-m", ProviderKind::Motive, true).await;

    async fn vehicles(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        // Inflated total forces a second page even though pages are small.
        match params.get("page_no").map(String::as_str) {
            Some("1") => Json(json!({
                "vehicles": [
                    {"vehicle": {"id": 1, "number": "A"}},
                    {"vehicle": {"id": 2, "number": "B"}}
                ],
                "pagination": {"per_page": 100, "page_no": 1, "total": 150}
            })),
            Some("2") => Json(json!({
                "vehicles": [{"vehicle": {"id": 3, "number": "C"}}],
                "pagination": {"per_page": 100, "page_no": 2, "total": 150}
            })),
            other => panic!("unexpected page_no {other:?}"),
        }
    }

    let router = Router::new()
        .route("/v1/vehicles", get(vehicles))
        .route(
            "/v1/vehicle_locations",
            get(|| async {
                Json(json!({"vehicle_locations": [], "pagination": {"total": 0}}))
            }),
        );
    let base = spawn_stub(router).await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    orchestrator.run(None).await.unwrap();

    let vehicles = db
        .search_vehicles("tenant-m", ProviderKind::Motive, None, 50)
        .await
        .unwrap();
    assert_eq!(vehicles.len(), 3);
}

#[tokio::test]
async fn non_json_provider_body_fails_the_tenant() {
    let db = create_test_database().await;
    seed_connection(&db, "tenant-a", ProviderKind::Samsara, true).await;

    let router = Router::new().fallback(|| async { "<html>maintenance</html>" });
    let base = spawn_stub(router).await;

    let orchestrator = create_test_orchestrator(db.clone(), &base, &base);
    let summary = orchestrator.run(None).await.unwrap();
    assert!(summary.all_failed());

    let runs = db.list_sync_runs("tenant-a", 10).await.unwrap();
    assert_eq!(runs[0].status, SyncRunStatus::Error);
}
