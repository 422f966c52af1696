// ABOUTME: Shared authenticated GET helper for provider API calls
// ABOUTME: Maps transport, status, and parse failures to distinct error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use reqwest::Client;
use serde_json::Value;

const BODY_SNIPPET_LEN: usize = 256;

/// Perform a bearer-authenticated GET and parse the JSON body
///
/// # Errors
///
/// - `NetworkError` when the request cannot be sent
/// - `ProviderApiError` on a non-2xx status, with the status code and a
///   truncated body snippet in the message
/// - `MalformedResponse` when the body is not valid JSON
pub async fn get_json(
    client: &Client,
    url: &str,
    access_token: &str,
    query: &[(&str, String)],
) -> AppResult<Value> {
    let response = client
        .get(url)
        .bearer_auth(access_token)
        .query(query)
        .send()
        .await
        .map_err(|e| AppError::network(format!("Request to {url} failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::network(format!("Failed to read response from {url}: {e}")))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
        return Err(AppError::provider_api(format!(
            "{url} returned status {status}: {snippet}"
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        AppError::malformed_response(format!("Non-JSON response from {url}: {e}"))
    })
}
