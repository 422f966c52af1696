// ABOUTME: Motive adapter: page-number pagination and snake_case field mapping
// ABOUTME: Records arrive under named envelopes with each item wrapped in a vehicle object
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::AppResult;
use crate::models::{NewLocation, NewVehicle, ProviderKind};
use crate::providers::{coerce, envelope, http, LocationSkip, TelemetryProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Production Motive API base URL
pub const DEFAULT_API_BASE: &str = "https://api.gomotive.com";

const PER_PAGE: i64 = 100;

const ID_FIELDS: &[&str] = &["id", "vehicle_id"];
const LATITUDE_FIELDS: &[&str] = &["current_location.lat", "lat", "latitude"];
const LONGITUDE_FIELDS: &[&str] = &["current_location.lon", "lon", "longitude"];
const LOCATED_AT_FIELDS: &[&str] = &[
    "current_location.located_at",
    "located_at",
    "updated_at",
    "created_at",
];

/// Motive (formerly KeepTruckin) fleet telematics adapter
pub struct MotiveProvider {
    api_base: String,
}

impl MotiveProvider {
    /// Build an adapter against the given API base URL
    #[must_use]
    pub fn new(api_base: String) -> Self {
        Self { api_base }
    }

    /// Walk a page-numbered endpoint until the reported total is covered
    ///
    /// Also stops on an empty page, which guards against a `total` that
    /// shrinks mid-walk.
    async fn fetch_all_pages(
        &self,
        client: &Client,
        access_token: &str,
        path: &str,
        envelope_field: &str,
    ) -> AppResult<Vec<Value>> {
        let url = format!("{}{path}", self.api_base);
        let mut records = Vec::new();
        let mut page_no: i64 = 1;

        loop {
            let query: Vec<(&str, String)> = vec![
                ("per_page", PER_PAGE.to_string()),
                ("page_no", page_no.to_string()),
            ];

            let body = http::get_json(client, &url, access_token, &query).await?;
            let page = envelope::extract_records(&body, &[envelope_field]);
            debug!(path, page_no, page_size = page.len(), "Fetched Motive page");
            if page.is_empty() {
                break;
            }
            records.extend(page);

            let total = body
                .get("pagination")
                .and_then(|p| p.get("total"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            if page_no * PER_PAGE >= total {
                break;
            }
            page_no += 1;
        }

        Ok(records)
    }
}

/// Unwrap Motive's `{"vehicle": {...}}` item wrapper when present
fn unwrap_item(record: &Value) -> &Value {
    record.get("vehicle").unwrap_or(record)
}

#[async_trait]
impl TelemetryProvider for MotiveProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Motive
    }

    fn pagination_param(&self) -> &'static str {
        "page_no"
    }

    async fn fetch_vehicles(
        &self,
        client: &Client,
        access_token: &str,
    ) -> AppResult<Vec<Value>> {
        self.fetch_all_pages(client, access_token, "/v1/vehicles", "vehicles")
            .await
    }

    async fn fetch_locations(
        &self,
        client: &Client,
        access_token: &str,
    ) -> AppResult<Vec<Value>> {
        self.fetch_all_pages(
            client,
            access_token,
            "/v1/vehicle_locations",
            "vehicle_locations",
        )
        .await
    }

    fn normalize_vehicle(&self, record: &Value) -> Option<NewVehicle> {
        let item = unwrap_item(record);
        let native_vehicle_id = coerce::native_id(item, ID_FIELDS)?;
        Some(NewVehicle {
            native_vehicle_id,
            name: coerce::first_string(item, &["number", "name"]),
            license_plate: coerce::first_string(item, &["license_plate_number"]),
            license_plate_state: coerce::first_string(item, &["license_plate_state"]),
            vin: coerce::first_string(item, &["vin"]),
            make: coerce::first_string(item, &["make"]),
            model: coerce::first_string(item, &["model"]),
            year: coerce::opt_i64(item, "year"),
            status: coerce::first_string(item, &["status"]),
            availability_status: coerce::first_string(item, &["availability.status"]),
            raw: record.clone(),
        })
    }

    fn normalize_location(&self, record: &Value) -> Result<NewLocation, LocationSkip> {
        let item = unwrap_item(record);
        let native_vehicle_id =
            coerce::native_id(item, ID_FIELDS).ok_or(LocationSkip::MissingId)?;
        let latitude =
            coerce::first_f64(item, LATITUDE_FIELDS).ok_or(LocationSkip::MissingCoordinates)?;
        let longitude =
            coerce::first_f64(item, LONGITUDE_FIELDS).ok_or(LocationSkip::MissingCoordinates)?;

        Ok(NewLocation {
            native_vehicle_id,
            latitude,
            longitude,
            heading: coerce::first_f64(item, &["current_location.bearing", "bearing"]),
            speed: coerce::first_f64(item, &["current_location.speed", "speed"]),
            odometer: coerce::first_f64(item, &["current_location.odometer", "odometer"]),
            engine_hours: coerce::first_f64(
                item,
                &["current_location.engine_hours", "engine_hours"],
            ),
            fuel_percent: coerce::first_f64(
                item,
                &["current_location.fuel_primary_remaining_percentage", "fuel"],
            ),
            battery_voltage: coerce::first_f64(
                item,
                &["current_location.battery_voltage", "battery_voltage"],
            ),
            ignition_on: coerce::first_bool(
                item,
                &["current_location.ignition_state", "ignition_on"],
            ),
            moving: coerce::first_bool(item, &["current_location.moving", "moving"]),
            located_at: coerce::resolve_timestamp(item, LOCATED_AT_FIELDS),
            raw: record.clone(),
        })
    }
}
