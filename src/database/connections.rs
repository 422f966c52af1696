// ABOUTME: Tenant connection resolution: which tenants sync against which providers
// ABOUTME: Read-only here; rows are written by the out-of-scope onboarding flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::database::{parse_stored_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ProviderKind, TenantConnection};
use sqlx::Row;

impl Database {
    /// List enabled tenant connections, optionally scoped to a single tenant
    ///
    /// Zero matches is not an error; the caller treats it as a no-op success.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row carries an
    /// unknown provider identifier.
    pub async fn list_enabled_connections(
        &self,
        tenant_id: Option<&str>,
    ) -> AppResult<Vec<TenantConnection>> {
        let rows = if let Some(tid) = tenant_id {
            sqlx::query(
                r"
                SELECT id, tenant_id, provider, access_token, enabled, sandbox, created_at
                FROM tenant_connections
                WHERE enabled = 1 AND tenant_id = ?
                ORDER BY tenant_id, provider
                ",
            )
            .bind(tid)
            .fetch_all(self.pool())
            .await
        } else {
            sqlx::query(
                r"
                SELECT id, tenant_id, provider, access_token, enabled, sandbox, created_at
                FROM tenant_connections
                WHERE enabled = 1
                ORDER BY tenant_id, provider
                ",
            )
            .fetch_all(self.pool())
            .await
        }
        .map_err(|e| AppError::database(format!("Failed to read tenant connections: {e}")))?;

        let mut connections = Vec::with_capacity(rows.len());
        for row in rows {
            let provider_str: String = row
                .try_get("provider")
                .map_err(|e| AppError::database(format!("Failed to get provider: {e}")))?;
            let provider: ProviderKind = provider_str
                .parse()
                .map_err(|e: AppError| AppError::database(e.message))?;
            let created_at_str: String = row
                .try_get("created_at")
                .map_err(|e| AppError::database(format!("Failed to get created_at: {e}")))?;

            connections.push(TenantConnection {
                id: row
                    .try_get("id")
                    .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?,
                tenant_id: row
                    .try_get("tenant_id")
                    .map_err(|e| AppError::database(format!("Failed to get tenant_id: {e}")))?,
                provider,
                access_token: row
                    .try_get("access_token")
                    .map_err(|e| AppError::database(format!("Failed to get access_token: {e}")))?,
                enabled: row
                    .try_get::<i64, _>("enabled")
                    .map_err(|e| AppError::database(format!("Failed to get enabled: {e}")))?
                    != 0,
                sandbox: row
                    .try_get::<i64, _>("sandbox")
                    .map_err(|e| AppError::database(format!("Failed to get sandbox: {e}")))?
                    != 0,
                created_at: parse_stored_timestamp(&created_at_str),
            });
        }

        Ok(connections)
    }
}
