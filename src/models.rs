// ABOUTME: Canonical data models shared across providers, persistence, and query layers
// ABOUTME: Provider kinds, composite ids, canonical vehicle/location rows, and sync audit types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported telemetry providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Samsara fleet telematics
    Samsara,
    /// Motive (formerly KeepTruckin) fleet telematics
    Motive,
}

impl ProviderKind {
    /// Stable lowercase identifier used in the database and composite ids
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Samsara => "samsara",
            Self::Motive => "motive",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "samsara" => Ok(Self::Samsara),
            "motive" => Ok(Self::Motive),
            other => Err(AppError::invalid_input(format!(
                "Unknown provider '{other}', expected 'samsara' or 'motive'"
            ))),
        }
    }
}

/// Provider selection for query-layer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFilter {
    /// Query every registered provider
    All,
    /// Query a single provider
    One(ProviderKind),
}

impl ProviderFilter {
    /// Providers selected by this filter, in registry order
    #[must_use]
    pub fn kinds(self) -> Vec<ProviderKind> {
        match self {
            Self::All => vec![ProviderKind::Samsara, ProviderKind::Motive],
            Self::One(kind) => vec![kind],
        }
    }
}

impl FromStr for ProviderFilter {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::One(s.parse()?))
        }
    }
}

/// Cross-provider vehicle reference of the form `"<provider>:<native_id>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    /// Owning provider
    pub provider: ProviderKind,
    /// Provider-native vehicle id
    pub native_id: String,
}

impl CompositeId {
    /// Build a composite id from its parts
    #[must_use]
    pub fn new(provider: ProviderKind, native_id: impl Into<String>) -> Self {
        Self {
            provider,
            native_id: native_id.into(),
        }
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.native_id)
    }
}

impl FromStr for CompositeId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let (provider_str, native_id) = s
            .split_once(':')
            .ok_or_else(|| AppError::invalid_input(format!("Invalid composite id '{s}'")))?;
        if native_id.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Composite id '{s}' has an empty native id"
            )));
        }
        Ok(Self {
            provider: provider_str.parse()?,
            native_id: native_id.to_owned(),
        })
    }
}

/// Tenant-scoped provider credential record (written by the onboarding flow)
#[derive(Debug, Clone)]
pub struct TenantConnection {
    /// Connection record id
    pub id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Provider this credential belongs to
    pub provider: ProviderKind,
    /// Bearer token for the provider API
    pub access_token: String,
    /// Whether this connection participates in sync
    pub enabled: bool,
    /// Whether the credential targets the provider's sandbox environment
    pub sandbox: bool,
    /// When the connection was created
    pub created_at: DateTime<Utc>,
}

/// Normalized vehicle row ready for upsert
#[derive(Debug, Clone)]
pub struct NewVehicle {
    /// Provider-native vehicle id
    pub native_vehicle_id: String,
    /// Display name or unit number
    pub name: Option<String>,
    /// License plate
    pub license_plate: Option<String>,
    /// License plate state
    pub license_plate_state: Option<String>,
    /// Vehicle identification number
    pub vin: Option<String>,
    /// Manufacturer
    pub make: Option<String>,
    /// Model
    pub model: Option<String>,
    /// Model year
    pub year: Option<i64>,
    /// Provider-reported status
    pub status: Option<String>,
    /// Provider-reported availability status
    pub availability_status: Option<String>,
    /// Complete original record, retained verbatim
    pub raw: Value,
}

/// Normalized location/telemetry row ready for upsert
///
/// Latitude and longitude are non-optional: a record that cannot resolve both
/// coordinates is skipped before this type is ever constructed.
#[derive(Debug, Clone)]
pub struct NewLocation {
    /// Provider-native vehicle id
    pub native_vehicle_id: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Heading in degrees
    pub heading: Option<f64>,
    /// Speed (provider units)
    pub speed: Option<f64>,
    /// Odometer reading (provider units)
    pub odometer: Option<f64>,
    /// Engine hours
    pub engine_hours: Option<f64>,
    /// Fuel level percentage
    pub fuel_percent: Option<f64>,
    /// Battery voltage
    pub battery_voltage: Option<f64>,
    /// Ignition state, when reported
    pub ignition_on: Option<bool>,
    /// Movement state, when reported
    pub moving: Option<bool>,
    /// Provider-reported fix time
    pub located_at: DateTime<Utc>,
    /// Complete original record, retained verbatim
    pub raw: Value,
}

/// Location snapshot joined onto a vehicle search result
#[derive(Debug, Clone, Serialize)]
pub struct LocationSnapshot {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Speed (provider units)
    pub speed: Option<f64>,
    /// Provider-reported fix time
    pub located_at: DateTime<Utc>,
}

/// Vehicle row returned by the query layer, before cross-provider merge
#[derive(Debug, Clone)]
pub struct VehicleSearchRow {
    /// Owning provider
    pub provider: ProviderKind,
    /// Provider-native vehicle id
    pub native_vehicle_id: String,
    /// Display name or unit number
    pub name: Option<String>,
    /// License plate
    pub license_plate: Option<String>,
    /// Vehicle identification number
    pub vin: Option<String>,
    /// Manufacturer
    pub make: Option<String>,
    /// Model
    pub model: Option<String>,
    /// Model year
    pub year: Option<i64>,
    /// Provider-reported status
    pub status: Option<String>,
    /// Provider-reported availability status
    pub availability_status: Option<String>,
    /// Last successful ingestion time for this row
    pub last_synced_at: DateTime<Utc>,
    /// Current location, when one exists
    pub location: Option<LocationSnapshot>,
}

/// Location row returned by the query layer, before cross-provider merge
#[derive(Debug, Clone)]
pub struct LocationSearchRow {
    /// Owning provider
    pub provider: ProviderKind,
    /// Provider-native vehicle id
    pub native_vehicle_id: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Heading in degrees
    pub heading: Option<f64>,
    /// Speed (provider units)
    pub speed: Option<f64>,
    /// Odometer reading (provider units)
    pub odometer: Option<f64>,
    /// Engine hours
    pub engine_hours: Option<f64>,
    /// Fuel level percentage
    pub fuel_percent: Option<f64>,
    /// Battery voltage
    pub battery_voltage: Option<f64>,
    /// Ignition state
    pub ignition_on: Option<bool>,
    /// Movement state
    pub moving: Option<bool>,
    /// Provider-reported fix time
    pub located_at: DateTime<Utc>,
    /// Last successful ingestion time for this row
    pub last_synced_at: DateTime<Utc>,
}

/// Lifecycle state of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRunStatus {
    /// Attempt in progress
    Running,
    /// Attempt completed successfully
    Success,
    /// Attempt failed
    Error,
}

impl SyncRunStatus {
    /// Stable lowercase identifier stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Parse the stored identifier back into a status
    #[must_use]
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Running,
        }
    }
}

/// Audit row for one tenant sync attempt
#[derive(Debug, Clone, Serialize)]
pub struct SyncRun {
    /// Run id
    pub id: String,
    /// Tenant this attempt belongs to
    pub tenant_id: String,
    /// When the attempt started
    pub started_at: DateTime<Utc>,
    /// When the attempt reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
    /// Lifecycle state
    pub status: SyncRunStatus,
    /// Rows synced on success
    pub total_count: Option<i64>,
    /// Records skipped for lacking a usable id
    pub skipped_without_id: Option<i64>,
    /// Location records skipped for lacking both coordinates
    pub skipped_without_lat_lon: Option<i64>,
    /// Failure description on error
    pub error_message: Option<String>,
    /// Pagination parameter the provider adapter drained
    pub pagination_param: Option<String>,
}

/// Per-tenant slot in the aggregate sync response
#[derive(Debug, Clone, Serialize)]
pub struct TenantSyncOutcome {
    /// Tenant attempted
    pub tenant_id: String,
    /// Provider attempted
    pub provider: ProviderKind,
    /// Rows synced
    pub synced: i64,
    /// Records skipped (missing id + missing coordinates)
    pub skipped: i64,
    /// Failure description, when the attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate response for one sync trigger
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    /// True unless every attempted tenant failed
    pub ok: bool,
    /// Informational message for no-op runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Tenants attempted
    pub total_tenants: usize,
    /// Rows synced across all tenants
    pub total_synced: i64,
    /// Records skipped across all tenants
    pub total_skipped: i64,
    /// One slot per attempted tenant, in attempt order
    pub results: Vec<TenantSyncOutcome>,
}

impl SyncSummary {
    /// Summary for a request that resolved zero enabled connections
    #[must_use]
    pub fn no_op() -> Self {
        Self {
            ok: true,
            message: Some("no enabled connections".to_owned()),
            total_tenants: 0,
            total_synced: 0,
            total_skipped: 0,
            results: Vec::new(),
        }
    }

    /// Build a summary from per-tenant outcomes
    #[must_use]
    pub fn from_outcomes(results: Vec<TenantSyncOutcome>) -> Self {
        let total_synced = results.iter().map(|r| r.synced).sum();
        let total_skipped = results.iter().map(|r| r.skipped).sum();
        let all_failed = !results.is_empty() && results.iter().all(|r| r.error.is_some());
        Self {
            ok: !all_failed,
            message: None,
            total_tenants: results.len(),
            total_synced,
            total_skipped,
            results,
        }
    }

    /// True when at least one tenant was attempted and every attempt failed
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.error.is_some())
    }
}
