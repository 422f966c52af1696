// ABOUTME: Samsara adapter: cursor-paginated fetch and camelCase field mapping
// ABOUTME: Pages carry a data envelope plus pagination.endCursor / hasNextPage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::AppResult;
use crate::models::{NewLocation, NewVehicle, ProviderKind};
use crate::providers::{coerce, envelope, http, LocationSkip, TelemetryProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Production Samsara API base URL
pub const DEFAULT_API_BASE: &str = "https://api.samsara.com";

// Samsara caps list endpoints at 512 records per page.
const PAGE_LIMIT: &str = "512";

const VEHICLE_ID_FIELDS: &[&str] = &["id"];
const LOCATION_ID_FIELDS: &[&str] = &["id", "vehicleId"];
const LATITUDE_FIELDS: &[&str] = &["gps.latitude", "location.latitude", "latitude"];
const LONGITUDE_FIELDS: &[&str] = &["gps.longitude", "location.longitude", "longitude"];
const LOCATED_AT_FIELDS: &[&str] = &[
    "gps.time",
    "location.time",
    "time",
    "updatedAtTime",
    "createdAtTime",
];

/// Samsara fleet telematics adapter
pub struct SamsaraProvider {
    api_base: String,
}

impl SamsaraProvider {
    /// Build an adapter against the given API base URL
    #[must_use]
    pub fn new(api_base: String) -> Self {
        Self { api_base }
    }

    /// Walk a cursor-paginated endpoint until `hasNextPage` goes false
    ///
    /// Also stops when the cursor fails to advance, which guards against an
    /// endpoint that keeps claiming another page with the same cursor.
    async fn fetch_all_pages(
        &self,
        client: &Client,
        access_token: &str,
        path: &str,
    ) -> AppResult<Vec<Value>> {
        let url = format!("{}{path}", self.api_base);
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("limit", PAGE_LIMIT.to_owned())];
            if let Some(c) = &cursor {
                query.push(("after", c.clone()));
            }

            let body = http::get_json(client, &url, access_token, &query).await?;
            let page = envelope::extract_records(&body, &["data"]);
            debug!(path, page_size = page.len(), "Fetched Samsara page");
            records.extend(page);

            let pagination = body.get("pagination");
            let has_next = pagination
                .and_then(|p| p.get("hasNextPage"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let end_cursor = pagination
                .and_then(|p| p.get("endCursor"))
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_owned);

            match (has_next, end_cursor) {
                (true, Some(next)) => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        warn!(path, cursor = %next, "Pagination cursor did not advance; stopping");
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl TelemetryProvider for SamsaraProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Samsara
    }

    fn pagination_param(&self) -> &'static str {
        "after"
    }

    async fn fetch_vehicles(
        &self,
        client: &Client,
        access_token: &str,
    ) -> AppResult<Vec<Value>> {
        self.fetch_all_pages(client, access_token, "/fleet/vehicles")
            .await
    }

    async fn fetch_locations(
        &self,
        client: &Client,
        access_token: &str,
    ) -> AppResult<Vec<Value>> {
        self.fetch_all_pages(client, access_token, "/fleet/vehicles/locations")
            .await
    }

    fn normalize_vehicle(&self, record: &Value) -> Option<NewVehicle> {
        let native_vehicle_id = coerce::native_id(record, VEHICLE_ID_FIELDS)?;
        Some(NewVehicle {
            native_vehicle_id,
            name: coerce::first_string(record, &["name", "label"]),
            license_plate: coerce::first_string(record, &["licensePlate"]),
            license_plate_state: coerce::first_string(record, &["licensePlateState"]),
            vin: coerce::first_string(record, &["vin", "externalIds.samsara.vin"]),
            make: coerce::first_string(record, &["make"]),
            model: coerce::first_string(record, &["model"]),
            year: coerce::opt_i64(record, "year"),
            status: coerce::first_string(record, &["vehicleRegulationMode", "status"]),
            availability_status: coerce::first_string(record, &["availabilityStatus"]),
            raw: record.clone(),
        })
    }

    fn normalize_location(&self, record: &Value) -> Result<NewLocation, LocationSkip> {
        let native_vehicle_id =
            coerce::native_id(record, LOCATION_ID_FIELDS).ok_or(LocationSkip::MissingId)?;
        let latitude =
            coerce::first_f64(record, LATITUDE_FIELDS).ok_or(LocationSkip::MissingCoordinates)?;
        let longitude =
            coerce::first_f64(record, LONGITUDE_FIELDS).ok_or(LocationSkip::MissingCoordinates)?;

        Ok(NewLocation {
            native_vehicle_id,
            latitude,
            longitude,
            heading: coerce::first_f64(
                record,
                &["gps.headingDegrees", "location.heading", "heading"],
            ),
            speed: coerce::first_f64(
                record,
                &["gps.speedMilesPerHour", "location.speed", "speed"],
            ),
            odometer: coerce::first_f64(record, &["obdOdometerMeters", "odometerMeters"]),
            engine_hours: coerce::first_f64(record, &["engineHours"]),
            fuel_percent: coerce::first_f64(record, &["fuelPercent", "fuelPercents"]),
            battery_voltage: coerce::first_f64(record, &["batteryMilliVolts", "batteryVoltage"]),
            ignition_on: coerce::first_bool(record, &["ignitionOn", "engineState.on"]),
            moving: coerce::first_bool(record, &["isMoving", "moving"]),
            located_at: coerce::resolve_timestamp(record, LOCATED_AT_FIELDS),
            raw: record.clone(),
        })
    }
}
