// ABOUTME: Provider adapter trait plus the registry of supported telematics APIs
// ABOUTME: Adapters own pagination, envelope shape, and field mapping for one provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

/// Tolerant field coercion from raw payloads
pub mod coerce;
/// Response envelope unwrapping
pub mod envelope;
/// Shared authenticated HTTP helper
pub mod http;
/// Motive (KeepTruckin) adapter
pub mod motive;
/// Samsara adapter
pub mod samsara;

use crate::errors::AppResult;
use crate::models::{NewLocation, NewVehicle, ProviderKind};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

/// Why a raw location record was excluded from the canonical store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSkip {
    /// No numeric-like vehicle id in any candidate field
    MissingId,
    /// Latitude or longitude absent; partial coordinates are never stored
    MissingCoordinates,
}

/// One telematics provider's API surface
///
/// Fetch methods return raw per-record JSON with pagination already walked;
/// normalization is a separate, synchronous step so it can be tested
/// without a live endpoint.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Name of the pagination parameter this provider's API uses
    fn pagination_param(&self) -> &'static str;

    /// Fetch every vehicle record for the authenticated fleet
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or returns non-JSON.
    async fn fetch_vehicles(&self, client: &Client, access_token: &str)
        -> AppResult<Vec<Value>>;

    /// Fetch every current-location record for the authenticated fleet
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or returns non-JSON.
    async fn fetch_locations(
        &self,
        client: &Client,
        access_token: &str,
    ) -> AppResult<Vec<Value>>;

    /// Map a raw vehicle record to the canonical shape
    ///
    /// Returns `None` when the record carries no usable vehicle id.
    fn normalize_vehicle(&self, record: &Value) -> Option<NewVehicle>;

    /// Map a raw location record to the canonical shape
    ///
    /// # Errors
    ///
    /// Returns the skip reason when the record lacks an id or a complete
    /// coordinate pair.
    fn normalize_location(&self, record: &Value) -> Result<NewLocation, LocationSkip>;
}

/// Build the adapter registry from configured API base URLs
#[must_use]
pub fn registry(samsara_api_base: &str, motive_api_base: &str) -> Vec<Arc<dyn TelemetryProvider>> {
    vec![
        Arc::new(samsara::SamsaraProvider::new(samsara_api_base.to_owned())),
        Arc::new(motive::MotiveProvider::new(motive_api_base.to_owned())),
    ]
}

/// Find the adapter for a provider kind within a registry
#[must_use]
pub fn find_adapter(
    providers: &[Arc<dyn TelemetryProvider>],
    kind: ProviderKind,
) -> Option<Arc<dyn TelemetryProvider>> {
    providers.iter().find(|p| p.kind() == kind).cloned()
}
