// ABOUTME: Canonical vehicle persistence: bulk upsert by composite key and tenant-scoped search
// ABOUTME: Conflict policy is last-writer-wins; the new payload fully replaces the prior row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::database::{parse_stored_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{LocationSnapshot, NewVehicle, ProviderKind, VehicleSearchRow};
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

// 14 binds per row keeps a full chunk well under SQLite's default 999 limit.
const UPSERT_CHUNK: usize = 50;

impl Database {
    /// Bulk-upsert normalized vehicles for one tenant/provider pair
    ///
    /// One multi-row statement per chunk inside a single transaction; the
    /// composite key (`tenant_id`, `provider`, `native_vehicle_id`) is the
    /// conflict target and every column is replaced on conflict. An empty
    /// slice is a valid successful outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or any statement fails.
    pub async fn upsert_vehicles(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        rows: &[NewVehicle],
    ) -> AppResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for chunk in rows.chunks(UPSERT_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO fleet_vehicles \
                 (tenant_id, provider, native_vehicle_id, name, license_plate, \
                  license_plate_state, vin, make, model, year, status, \
                  availability_status, raw, last_synced_at) ",
            );
            qb.push_values(chunk, |mut b, v| {
                b.push_bind(tenant_id)
                    .push_bind(provider.as_str())
                    .push_bind(&v.native_vehicle_id)
                    .push_bind(v.name.as_deref())
                    .push_bind(v.license_plate.as_deref())
                    .push_bind(v.license_plate_state.as_deref())
                    .push_bind(v.vin.as_deref())
                    .push_bind(v.make.as_deref())
                    .push_bind(v.model.as_deref())
                    .push_bind(v.year)
                    .push_bind(v.status.as_deref())
                    .push_bind(v.availability_status.as_deref())
                    .push_bind(v.raw.to_string())
                    .push_bind(&now);
            });
            qb.push(
                " ON CONFLICT(tenant_id, provider, native_vehicle_id) DO UPDATE SET \
                 name = excluded.name, \
                 license_plate = excluded.license_plate, \
                 license_plate_state = excluded.license_plate_state, \
                 vin = excluded.vin, \
                 make = excluded.make, \
                 model = excluded.model, \
                 year = excluded.year, \
                 status = excluded.status, \
                 availability_status = excluded.availability_status, \
                 raw = excluded.raw, \
                 last_synced_at = excluded.last_synced_at",
            );
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to upsert vehicles: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit vehicle upsert: {e}")))?;
        Ok(())
    }

    /// Search one provider's canonical vehicles for a tenant
    ///
    /// Joins each vehicle's current location row when one exists. Results are
    /// ordered by location recency (rows without a location sort last); the
    /// cross-provider merge happens in the query layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_vehicles(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        free_text: Option<&str>,
        limit: i64,
    ) -> AppResult<Vec<VehicleSearchRow>> {
        let rows = if let Some(query) = free_text.filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", query.trim());
            sqlx::query(
                r"
                SELECT v.native_vehicle_id, v.name, v.license_plate, v.vin, v.make,
                       v.model, v.year, v.status, v.availability_status, v.last_synced_at,
                       l.latitude, l.longitude, l.speed, l.located_at
                FROM fleet_vehicles v
                LEFT JOIN fleet_locations l
                  ON l.tenant_id = v.tenant_id
                 AND l.provider = v.provider
                 AND l.native_vehicle_id = v.native_vehicle_id
                WHERE v.tenant_id = ? AND v.provider = ?
                  AND (v.name LIKE ? OR v.license_plate LIKE ? OR v.vin LIKE ?
                       OR v.native_vehicle_id LIKE ?)
                ORDER BY l.located_at DESC
                LIMIT ?
                ",
            )
            .bind(tenant_id)
            .bind(provider.as_str())
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(self.pool())
            .await
        } else {
            sqlx::query(
                r"
                SELECT v.native_vehicle_id, v.name, v.license_plate, v.vin, v.make,
                       v.model, v.year, v.status, v.availability_status, v.last_synced_at,
                       l.latitude, l.longitude, l.speed, l.located_at
                FROM fleet_vehicles v
                LEFT JOIN fleet_locations l
                  ON l.tenant_id = v.tenant_id
                 AND l.provider = v.provider
                 AND l.native_vehicle_id = v.native_vehicle_id
                WHERE v.tenant_id = ? AND v.provider = ?
                ORDER BY l.located_at DESC
                LIMIT ?
                ",
            )
            .bind(tenant_id)
            .bind(provider.as_str())
            .bind(limit)
            .fetch_all(self.pool())
            .await
        }
        .map_err(|e| AppError::database(format!("Failed to search vehicles: {e}")))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let last_synced_str: String = row
                .try_get("last_synced_at")
                .map_err(|e| AppError::database(format!("Failed to get last_synced_at: {e}")))?;

            let latitude: Option<f64> = row
                .try_get("latitude")
                .map_err(|e| AppError::database(format!("Failed to get latitude: {e}")))?;
            let longitude: Option<f64> = row
                .try_get("longitude")
                .map_err(|e| AppError::database(format!("Failed to get longitude: {e}")))?;
            let located_at_str: Option<String> = row
                .try_get("located_at")
                .map_err(|e| AppError::database(format!("Failed to get located_at: {e}")))?;

            let location = match (latitude, longitude, located_at_str) {
                (Some(lat), Some(lon), Some(at)) => Some(LocationSnapshot {
                    latitude: lat,
                    longitude: lon,
                    speed: row
                        .try_get("speed")
                        .map_err(|e| AppError::database(format!("Failed to get speed: {e}")))?,
                    located_at: parse_stored_timestamp(&at),
                }),
                _ => None,
            };

            results.push(VehicleSearchRow {
                provider,
                native_vehicle_id: row.try_get("native_vehicle_id").map_err(|e| {
                    AppError::database(format!("Failed to get native_vehicle_id: {e}"))
                })?,
                name: row
                    .try_get("name")
                    .map_err(|e| AppError::database(format!("Failed to get name: {e}")))?,
                license_plate: row
                    .try_get("license_plate")
                    .map_err(|e| AppError::database(format!("Failed to get license_plate: {e}")))?,
                vin: row
                    .try_get("vin")
                    .map_err(|e| AppError::database(format!("Failed to get vin: {e}")))?,
                make: row
                    .try_get("make")
                    .map_err(|e| AppError::database(format!("Failed to get make: {e}")))?,
                model: row
                    .try_get("model")
                    .map_err(|e| AppError::database(format!("Failed to get model: {e}")))?,
                year: row
                    .try_get("year")
                    .map_err(|e| AppError::database(format!("Failed to get year: {e}")))?,
                status: row
                    .try_get("status")
                    .map_err(|e| AppError::database(format!("Failed to get status: {e}")))?,
                availability_status: row.try_get("availability_status").map_err(|e| {
                    AppError::database(format!("Failed to get availability_status: {e}"))
                })?,
                last_synced_at: parse_stored_timestamp(&last_synced_str),
                location,
            });
        }

        Ok(results)
    }
}
