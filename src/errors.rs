// ABOUTME: Unified error handling with standard error codes and HTTP responses
// ABOUTME: Defines AppError/AppResult used by every module plus the axum response mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Standard error codes covering both request-scoped and tenant-scoped failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or invalid server-side configuration (fatal for the request)
    ConfigError,
    /// No credentials were presented
    AuthRequired,
    /// Credentials were presented but could not be validated
    AuthInvalid,
    /// Caller-supplied input failed validation
    InvalidInput,
    /// A referenced resource does not exist
    ResourceNotFound,
    /// Database query or upsert failure
    DatabaseError,
    /// Provider host unreachable or timed out (tenant-scoped)
    NetworkError,
    /// Provider returned a non-2xx status (tenant-scoped)
    ProviderApiError,
    /// Provider body could not be parsed as JSON (tenant-scoped)
    MalformedResponse,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Stable string form used in JSON error envelopes
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "config_error",
            Self::AuthRequired => "auth_required",
            Self::AuthInvalid => "auth_invalid",
            Self::InvalidInput => "invalid_input",
            Self::ResourceNotFound => "resource_not_found",
            Self::DatabaseError => "database_error",
            Self::NetworkError => "network_error",
            Self::ProviderApiError => "provider_api_error",
            Self::MalformedResponse => "malformed_response",
            Self::InternalError => "internal_error",
        }
    }
}

/// Application error carrying a code and a human-readable message
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// Machine-readable error classification
    pub code: ErrorCode,
    /// Human-readable description
    pub message: String,
}

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing required server-side configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// No credentials presented
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Credentials presented but invalid
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Caller-supplied input failed validation
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource does not exist
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Database query or upsert failure
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Provider host unreachable or timed out
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// Provider returned a non-2xx status
    pub fn provider_api(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderApiError, message)
    }

    /// Provider body could not be parsed
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResponse, message)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP status this error maps to at the route boundary
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self.code {
            ErrorCode::AuthRequired | ErrorCode::AuthInvalid => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::NetworkError
            | ErrorCode::ProviderApiError
            | ErrorCode::MalformedResponse => StatusCode::BAD_GATEWAY,
            ErrorCode::ConfigError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(format!("Database operation failed: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = Json(json!({
            "error": self.message,
            "code": self.code.as_str(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn tenant_scoped_provider_errors_map_to_bad_gateway() {
        assert_eq!(
            AppError::network("unreachable").http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::provider_api("HTTP 500").http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::malformed_response("not json").http_status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn config_errors_are_internal_server_errors() {
        assert_eq!(
            AppError::config("SYNC_TRIGGER_SECRET is not set").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_formats_resource_name() {
        let err = AppError::not_found("Vehicle");
        assert_eq!(err.message, "Vehicle not found");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }
}
