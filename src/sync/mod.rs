// ABOUTME: Sync orchestrator: credential resolution, fetch, normalize, upsert, audit
// ABOUTME: Tenants run sequentially; one tenant's failure never blocks the rest
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::database::sync_runs::RunCounts;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{NewLocation, NewVehicle, SyncSummary, TenantConnection, TenantSyncOutcome};
use crate::providers::{find_adapter, LocationSkip, TelemetryProvider};
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives the full ingest pipeline for every enabled tenant connection
pub struct SyncOrchestrator {
    database: Arc<Database>,
    http: Client,
    providers: Vec<Arc<dyn TelemetryProvider>>,
    run_ttl_minutes: i64,
}

/// Counters produced by one tenant's normalize phase
#[derive(Debug, Default)]
struct NormalizedBatch {
    vehicles: Vec<NewVehicle>,
    locations: Vec<NewLocation>,
    skipped_without_id: i64,
    skipped_without_lat_lon: i64,
}

impl SyncOrchestrator {
    /// Build an orchestrator over the shared database, HTTP client, and adapters
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        http: Client,
        providers: Vec<Arc<dyn TelemetryProvider>>,
        run_ttl_minutes: i64,
    ) -> Self {
        Self {
            database,
            http,
            providers,
            run_ttl_minutes,
        }
    }

    /// Run a sync pass, optionally scoped to a single tenant
    ///
    /// Abandoned audit rows are reaped first. Connection resolution failure
    /// aborts the whole request; per-tenant failures are captured in the
    /// summary instead.
    ///
    /// # Errors
    ///
    /// Returns an error only when the enabled connections cannot be read.
    pub async fn run(&self, tenant_id: Option<&str>) -> AppResult<SyncSummary> {
        match self.database.reap_abandoned_runs(self.run_ttl_minutes).await {
            Ok(0) => {}
            Ok(reaped) => warn!(reaped, "Reaped abandoned sync runs"),
            Err(e) => warn!(error = %e, "Failed to reap abandoned sync runs"),
        }

        let connections = self.database.list_enabled_connections(tenant_id).await?;
        if connections.is_empty() {
            info!("Sync requested with no enabled connections");
            return Ok(SyncSummary::no_op());
        }

        let mut outcomes = Vec::with_capacity(connections.len());
        for connection in &connections {
            outcomes.push(self.sync_connection(connection).await);
        }

        let summary = SyncSummary::from_outcomes(outcomes);
        info!(
            tenants = summary.total_tenants,
            synced = summary.total_synced,
            skipped = summary.total_skipped,
            ok = summary.ok,
            "Sync pass complete"
        );
        Ok(summary)
    }

    /// Sync one tenant connection end to end, recording the audit row
    async fn sync_connection(&self, connection: &TenantConnection) -> TenantSyncOutcome {
        let tenant_id = connection.tenant_id.as_str();
        let provider = connection.provider;

        let Some(adapter) = find_adapter(&self.providers, provider) else {
            // Unreachable while the registry covers every ProviderKind.
            return TenantSyncOutcome {
                tenant_id: tenant_id.to_owned(),
                provider,
                synced: 0,
                skipped: 0,
                error: Some(format!("No adapter registered for provider '{provider}'")),
            };
        };

        let run = match self.database.create_sync_run(tenant_id).await {
            Ok(run) => run,
            Err(e) => {
                error!(tenant_id, %provider, error = %e, "Failed to open sync run");
                return TenantSyncOutcome {
                    tenant_id: tenant_id.to_owned(),
                    provider,
                    synced: 0,
                    skipped: 0,
                    error: Some(e.message),
                };
            }
        };

        match self.ingest(connection, adapter.as_ref()).await {
            Ok(batch) => {
                let counts = RunCounts {
                    total: (batch.vehicles.len() + batch.locations.len()) as i64,
                    skipped_without_id: batch.skipped_without_id,
                    skipped_without_lat_lon: batch.skipped_without_lat_lon,
                };
                if let Err(e) = self
                    .database
                    .finalize_sync_run_success(&run.id, counts, adapter.pagination_param())
                    .await
                {
                    error!(run_id = %run.id, error = %e, "Failed to finalize sync run");
                }
                info!(
                    tenant_id,
                    %provider,
                    synced = counts.total,
                    skipped_without_id = counts.skipped_without_id,
                    skipped_without_lat_lon = counts.skipped_without_lat_lon,
                    "Tenant sync succeeded"
                );
                TenantSyncOutcome {
                    tenant_id: tenant_id.to_owned(),
                    provider,
                    synced: counts.total,
                    skipped: counts.skipped_without_id + counts.skipped_without_lat_lon,
                    error: None,
                }
            }
            Err(e) => {
                warn!(tenant_id, %provider, error = %e, "Tenant sync failed");
                if let Err(fin) = self
                    .database
                    .finalize_sync_run_error(&run.id, &e.message)
                    .await
                {
                    error!(run_id = %run.id, error = %fin, "Failed to finalize sync run");
                }
                TenantSyncOutcome {
                    tenant_id: tenant_id.to_owned(),
                    provider,
                    synced: 0,
                    skipped: 0,
                    error: Some(e.message),
                }
            }
        }
    }

    /// Fetch, normalize, and upsert both entity types for one connection
    async fn ingest(
        &self,
        connection: &TenantConnection,
        adapter: &dyn TelemetryProvider,
    ) -> Result<NormalizedBatch, AppError> {
        let token = connection.access_token.as_str();
        let raw_vehicles = adapter.fetch_vehicles(&self.http, token).await?;
        let raw_locations = adapter.fetch_locations(&self.http, token).await?;

        let mut batch = NormalizedBatch::default();
        for record in &raw_vehicles {
            match adapter.normalize_vehicle(record) {
                Some(vehicle) => batch.vehicles.push(vehicle),
                None => batch.skipped_without_id += 1,
            }
        }
        for record in &raw_locations {
            match adapter.normalize_location(record) {
                Ok(location) => batch.locations.push(location),
                Err(LocationSkip::MissingId) => batch.skipped_without_id += 1,
                Err(LocationSkip::MissingCoordinates) => batch.skipped_without_lat_lon += 1,
            }
        }

        self.database
            .upsert_vehicles(&connection.tenant_id, connection.provider, &batch.vehicles)
            .await?;
        self.database
            .upsert_locations(&connection.tenant_id, connection.provider, &batch.locations)
            .await?;

        Ok(batch)
    }
}
