// ABOUTME: Canonical location persistence: bulk upsert by composite key and tenant-scoped search
// ABOUTME: Latitude/longitude are NOT NULL columns; rows missing either never reach this layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::database::{parse_stored_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{LocationSearchRow, NewLocation, ProviderKind};
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

// 16 binds per row keeps a full chunk well under SQLite's default 999 limit.
const UPSERT_CHUNK: usize = 50;

const SEARCH_COLUMNS: &str = r"
    SELECT native_vehicle_id, latitude, longitude, heading, speed, odometer,
           engine_hours, fuel_percent, battery_voltage, ignition_on, moving,
           located_at, last_synced_at
    FROM fleet_locations
";

impl Database {
    /// Bulk-upsert normalized locations for one tenant/provider pair
    ///
    /// Same conflict policy as vehicles: last writer wins, whole-row
    /// replacement, no field-level merge. An empty slice is a valid
    /// successful outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or any statement fails.
    pub async fn upsert_locations(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        rows: &[NewLocation],
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
                "INSERT INTO fleet_locations \
                 (tenant_id, provider, native_vehicle_id, latitude, longitude, heading, \
                  speed, odometer, engine_hours, fuel_percent, battery_voltage, \
                  ignition_on, moving, located_at, last_synced_at, raw) ",
            );
            qb.push_values(chunk, |mut b, l| {
                b.push_bind(tenant_id)
                    .push_bind(provider.as_str())
                    .push_bind(&l.native_vehicle_id)
                    .push_bind(l.latitude)
                    .push_bind(l.longitude)
                    .push_bind(l.heading)
                    .push_bind(l.speed)
                    .push_bind(l.odometer)
                    .push_bind(l.engine_hours)
                    .push_bind(l.fuel_percent)
                    .push_bind(l.battery_voltage)
                    .push_bind(l.ignition_on)
                    .push_bind(l.moving)
                    .push_bind(l.located_at.to_rfc3339())
                    .push_bind(&now)
                    .push_bind(l.raw.to_string());
            });
            qb.push(
                " ON CONFLICT(tenant_id, provider, native_vehicle_id) DO UPDATE SET \
                 latitude = excluded.latitude, \
                 longitude = excluded.longitude, \
                 heading = excluded.heading, \
                 speed = excluded.speed, \
                 odometer = excluded.odometer, \
                 engine_hours = excluded.engine_hours, \
                 fuel_percent = excluded.fuel_percent, \
                 battery_voltage = excluded.battery_voltage, \
                 ignition_on = excluded.ignition_on, \
                 moving = excluded.moving, \
                 located_at = excluded.located_at, \
                 last_synced_at = excluded.last_synced_at, \
                 raw = excluded.raw",
            );
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to upsert locations: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit location upsert: {e}")))?;
        Ok(())
    }

    /// Search one provider's canonical locations for a tenant
    ///
    /// A `native_id` restricts the query to exactly that vehicle; free text
    /// matches against the native vehicle id. Ordered by fix recency.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_locations(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        native_id: Option<&str>,
        free_text: Option<&str>,
        limit: i64,
    ) -> AppResult<Vec<LocationSearchRow>> {
        let rows = if let Some(id) = native_id {
            sqlx::query(&format!(
                "{SEARCH_COLUMNS} WHERE tenant_id = ? AND provider = ? AND native_vehicle_id = ? \
                 ORDER BY located_at DESC LIMIT ?"
            ))
            .bind(tenant_id)
            .bind(provider.as_str())
            .bind(id)
            .bind(limit)
            .fetch_all(self.pool())
            .await
        } else if let Some(query) = free_text.filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", query.trim());
            sqlx::query(&format!(
                "{SEARCH_COLUMNS} WHERE tenant_id = ? AND provider = ? AND native_vehicle_id LIKE ? \
                 ORDER BY located_at DESC LIMIT ?"
            ))
            .bind(tenant_id)
            .bind(provider.as_str())
            .bind(&pattern)
            .bind(limit)
            .fetch_all(self.pool())
            .await
        } else {
            sqlx::query(&format!(
                "{SEARCH_COLUMNS} WHERE tenant_id = ? AND provider = ? \
                 ORDER BY located_at DESC LIMIT ?"
            ))
            .bind(tenant_id)
            .bind(provider.as_str())
            .bind(limit)
            .fetch_all(self.pool())
            .await
        }
        .map_err(|e| AppError::database(format!("Failed to search locations: {e}")))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let located_at_str: String = row
                .try_get("located_at")
                .map_err(|e| AppError::database(format!("Failed to get located_at: {e}")))?;
            let last_synced_str: String = row
                .try_get("last_synced_at")
                .map_err(|e| AppError::database(format!("Failed to get last_synced_at: {e}")))?;
            let ignition_on: Option<i64> = row
                .try_get("ignition_on")
                .map_err(|e| AppError::database(format!("Failed to get ignition_on: {e}")))?;
            let moving: Option<i64> = row
                .try_get("moving")
                .map_err(|e| AppError::database(format!("Failed to get moving: {e}")))?;

            results.push(LocationSearchRow {
                provider,
                native_vehicle_id: row.try_get("native_vehicle_id").map_err(|e| {
                    AppError::database(format!("Failed to get native_vehicle_id: {e}"))
                })?,
                latitude: row
                    .try_get("latitude")
                    .map_err(|e| AppError::database(format!("Failed to get latitude: {e}")))?,
                longitude: row
                    .try_get("longitude")
                    .map_err(|e| AppError::database(format!("Failed to get longitude: {e}")))?,
                heading: row
                    .try_get("heading")
                    .map_err(|e| AppError::database(format!("Failed to get heading: {e}")))?,
                speed: row
                    .try_get("speed")
                    .map_err(|e| AppError::database(format!("Failed to get speed: {e}")))?,
                odometer: row
                    .try_get("odometer")
                    .map_err(|e| AppError::database(format!("Failed to get odometer: {e}")))?,
                engine_hours: row
                    .try_get("engine_hours")
                    .map_err(|e| AppError::database(format!("Failed to get engine_hours: {e}")))?,
                fuel_percent: row
                    .try_get("fuel_percent")
                    .map_err(|e| AppError::database(format!("Failed to get fuel_percent: {e}")))?,
                battery_voltage: row.try_get("battery_voltage").map_err(|e| {
                    AppError::database(format!("Failed to get battery_voltage: {e}"))
                })?,
                ignition_on: ignition_on.map(|v| v != 0),
                moving: moving.map(|v| v != 0),
                located_at: parse_stored_timestamp(&located_at_str),
                last_synced_at: parse_stored_timestamp(&last_synced_str),
            });
        }

        Ok(results)
    }
}
