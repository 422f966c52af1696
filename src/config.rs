// ABOUTME: Environment-only server configuration loaded once at startup
// ABOUTME: Required secrets are validated here; optional knobs carry defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use std::env;

/// Default HTTP port when `HTTP_PORT` is not set
pub const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default hours after which a canonical row is tagged stale at read time
pub const DEFAULT_STALE_AFTER_HOURS: i64 = 24;
/// Default minutes after which a `running` sync run is reaped as abandoned
pub const DEFAULT_SYNC_RUN_TTL_MINUTES: i64 = 15;

/// Server configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// `SQLite` database URL
    pub database_url: String,
    /// HS256 secret for query-layer JWTs
    pub jwt_secret: String,
    /// Shared secret required to trigger a sync; `None` when unconfigured
    pub sync_trigger_secret: Option<String>,
    /// Samsara API base URL (override for tests)
    pub samsara_api_base: String,
    /// Motive API base URL (override for tests)
    pub motive_api_base: String,
    /// Hours after which a canonical row is considered stale
    pub stale_after_hours: i64,
    /// TTL for abandoned `running` sync runs
    pub sync_run_ttl_minutes: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Required: `DATABASE_URL`, `JWT_SECRET`. `SYNC_TRIGGER_SECRET` is read
    /// but its absence is only surfaced when the sync route is hit, so the
    /// query layer stays usable on a partially configured deployment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required variable is missing or a numeric
    /// variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let database_url = require_var("DATABASE_URL")?;
        let jwt_secret = require_var("JWT_SECRET")?;
        let sync_trigger_secret = env::var("SYNC_TRIGGER_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let http_port = parse_var("HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let stale_after_hours = parse_var("STALE_AFTER_HOURS", DEFAULT_STALE_AFTER_HOURS)?;
        let sync_run_ttl_minutes = parse_var("SYNC_RUN_TTL_MINUTES", DEFAULT_SYNC_RUN_TTL_MINUTES)?;

        let samsara_api_base = env::var("SAMSARA_API_BASE")
            .unwrap_or_else(|_| crate::providers::samsara::DEFAULT_API_BASE.to_owned());
        let motive_api_base = env::var("MOTIVE_API_BASE")
            .unwrap_or_else(|_| crate::providers::motive::DEFAULT_API_BASE.to_owned());

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            sync_trigger_secret,
            samsara_api_base,
            motive_api_base,
            stale_after_hours,
            sync_run_ttl_minutes,
        })
    }
}

fn require_var(name: &str) -> AppResult<String> {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::config(format!("{name} environment variable is not set")))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} is not a valid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
