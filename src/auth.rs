// ABOUTME: Caller identity for the query-tool boundary via HS256 JWTs
// ABOUTME: Tenant scope is always derived from the validated token, never from caller input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::errors::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims for query-layer callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Tenant id this caller is scoped to
    pub sub: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Validates and mints caller tokens
#[derive(Clone)]
pub struct AuthManager {
    secret: String,
}

impl AuthManager {
    /// Create a manager around the configured HS256 secret
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint a token scoped to a tenant (used by onboarding and tests)
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn generate_token(&self, tenant_id: &str, valid_hours: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: tenant_id.to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(valid_hours)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Validate a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// Returns an `AuthInvalid` error if the signature is wrong, the token is
    /// expired, or the tenant subject is empty.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::auth_invalid(format!("Failed to validate token: {e}")))?;

        if data.claims.sub.is_empty() {
            return Err(AppError::auth_invalid("Token has an empty tenant subject"));
        }
        Ok(data.claims)
    }

    /// Extract and validate the bearer token from an `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing and `AuthInvalid`
    /// when the scheme or token is wrong.
    pub fn authenticate_header(&self, header: Option<&str>) -> AppResult<Claims> {
        let value =
            header.ok_or_else(|| AppError::auth_required("Missing authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must use Bearer scheme"))?;
        self.validate_token(token)
    }
}
