// ABOUTME: FleetSync library root: multi-tenant fleet telemetry sync and unified query API
// ABOUTME: Pulls provider data into a canonical store and serves it to dashboards and LLMs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

//! FleetSync synchronizes vehicle and location telemetry from multiple
//! telematics providers into one canonical, tenant-scoped store, then
//! exposes that store through cross-provider query tools.
//!
//! The pipeline per tenant connection: resolve credentials, fetch every
//! page from the provider, normalize records into canonical rows, upsert
//! idempotently, and record an audit row for the attempt. The query layer
//! merges per-provider results and tags rows with composite ids of the
//! form `"<provider>:<native_id>"`.

/// Caller identity for the query-tool boundary
pub mod auth;
/// Environment-driven server configuration
pub mod config;
/// Connection pool, migrations, and persistence
pub mod database;
/// Unified error handling
pub mod errors;
/// Canonical data models
pub mod models;
/// Provider adapters and fetch plumbing
pub mod providers;
/// Shared server resources
pub mod resources;
/// HTTP API surface
pub mod routes;
/// Sync orchestration
pub mod sync;
/// Query tool registry and tools
pub mod tools;
