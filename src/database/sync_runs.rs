// ABOUTME: Sync run audit lifecycle: create, finalize exactly once, reap abandoned runs
// ABOUTME: The only valid transitions are running -> success and running -> error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::database::{parse_stored_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{SyncRun, SyncRunStatus};
use chrono::{Duration, Utc};
use sqlx::Row;
use uuid::Uuid;

/// Successful run counters recorded on finalize
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounts {
    /// Rows synced across both entity types
    pub total: i64,
    /// Records skipped for lacking a usable id
    pub skipped_without_id: i64,
    /// Location records skipped for lacking both coordinates
    pub skipped_without_lat_lon: i64,
}

impl Database {
    /// Create a sync run in the `running` state
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_sync_run(&self, tenant_id: &str) -> AppResult<SyncRun> {
        let id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        sqlx::query(
            r"
            INSERT INTO sync_runs (id, tenant_id, started_at, status)
            VALUES (?, ?, ?, 'running')
            ",
        )
        .bind(&id)
        .bind(tenant_id)
        .bind(started_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create sync run: {e}")))?;

        Ok(SyncRun {
            id,
            tenant_id: tenant_id.to_owned(),
            started_at,
            finished_at: None,
            status: SyncRunStatus::Running,
            total_count: None,
            skipped_without_id: None,
            skipped_without_lat_lon: None,
            error_message: None,
            pagination_param: None,
        })
    }

    /// Finalize a run as `success` with its counters
    ///
    /// The update is guarded on `status = 'running'`; finalizing a run twice
    /// (or finalizing an unknown run) is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the run is not `running`.
    pub async fn finalize_sync_run_success(
        &self,
        run_id: &str,
        counts: RunCounts,
        pagination_param: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE sync_runs
            SET status = 'success', finished_at = ?, total_count = ?,
                skipped_without_id = ?, skipped_without_lat_lon = ?,
                pagination_param = ?
            WHERE id = ? AND status = 'running'
            ",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(counts.total)
        .bind(counts.skipped_without_id)
        .bind(counts.skipped_without_lat_lon)
        .bind(pagination_param)
        .bind(run_id)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to finalize sync run: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::invalid_input(format!(
                "Sync run {run_id} is not running; it was already finalized or never existed"
            )));
        }
        Ok(())
    }

    /// Finalize a run as `error` with the underlying message
    ///
    /// Same exactly-once guard as the success path.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the run is not `running`.
    pub async fn finalize_sync_run_error(&self, run_id: &str, message: &str) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE sync_runs
            SET status = 'error', finished_at = ?, error_message = ?
            WHERE id = ? AND status = 'running'
            ",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(message)
        .bind(run_id)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to finalize sync run: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::invalid_input(format!(
                "Sync run {run_id} is not running; it was already finalized or never existed"
            )));
        }
        Ok(())
    }

    /// Mark `running` runs older than the TTL as abandoned errors
    ///
    /// Recovers audit rows stranded by a crash or host-level timeout. Uses
    /// the same guarded transition, so a run finalized concurrently is left
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn reap_abandoned_runs(&self, ttl_minutes: i64) -> AppResult<u64> {
        let cutoff = (Utc::now() - Duration::minutes(ttl_minutes)).to_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE sync_runs
            SET status = 'error', finished_at = ?,
                error_message = 'abandoned: exceeded run TTL'
            WHERE status = 'running' AND started_at < ?
            ",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(&cutoff)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to reap abandoned sync runs: {e}")))?;

        Ok(result.rows_affected())
    }

    /// Fetch a sync run by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the run does not exist.
    pub async fn get_sync_run(&self, run_id: &str) -> AppResult<SyncRun> {
        let row = sqlx::query(
            r"
            SELECT id, tenant_id, started_at, finished_at, status, total_count,
                   skipped_without_id, skipped_without_lat_lon, error_message,
                   pagination_param
            FROM sync_runs
            WHERE id = ?
            ",
        )
        .bind(run_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to read sync run: {e}")))?;

        row.map_or_else(|| Err(AppError::not_found("Sync run")), map_sync_run)
    }

    /// List a tenant's most recent sync runs
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_sync_runs(&self, tenant_id: &str, limit: i64) -> AppResult<Vec<SyncRun>> {
        let rows = sqlx::query(
            r"
            SELECT id, tenant_id, started_at, finished_at, status, total_count,
                   skipped_without_id, skipped_without_lat_lon, error_message,
                   pagination_param
            FROM sync_runs
            WHERE tenant_id = ?
            ORDER BY started_at DESC
            LIMIT ?
            ",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list sync runs: {e}")))?;

        rows.into_iter().map(map_sync_run).collect()
    }
}

fn map_sync_run(row: sqlx::sqlite::SqliteRow) -> AppResult<SyncRun> {
    let started_at_str: String = row
        .try_get("started_at")
        .map_err(|e| AppError::database(format!("Failed to get started_at: {e}")))?;
    let finished_at_str: Option<String> = row
        .try_get("finished_at")
        .map_err(|e| AppError::database(format!("Failed to get finished_at: {e}")))?;
    let status_str: String = row
        .try_get("status")
        .map_err(|e| AppError::database(format!("Failed to get status: {e}")))?;

    Ok(SyncRun {
        id: row
            .try_get("id")
            .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?,
        tenant_id: row
            .try_get("tenant_id")
            .map_err(|e| AppError::database(format!("Failed to get tenant_id: {e}")))?,
        started_at: parse_stored_timestamp(&started_at_str),
        finished_at: finished_at_str.as_deref().map(parse_stored_timestamp),
        status: SyncRunStatus::from_db_string(&status_str),
        total_count: row
            .try_get("total_count")
            .map_err(|e| AppError::database(format!("Failed to get total_count: {e}")))?,
        skipped_without_id: row
            .try_get("skipped_without_id")
            .map_err(|e| AppError::database(format!("Failed to get skipped_without_id: {e}")))?,
        skipped_without_lat_lon: row.try_get("skipped_without_lat_lon").map_err(|e| {
            AppError::database(format!("Failed to get skipped_without_lat_lon: {e}"))
        })?,
        error_message: row
            .try_get("error_message")
            .map_err(|e| AppError::database(format!("Failed to get error_message: {e}")))?,
        pagination_param: row
            .try_get("pagination_param")
            .map_err(|e| AppError::database(format!("Failed to get pagination_param: {e}")))?,
    })
}
