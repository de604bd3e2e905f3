// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

// =============================================================================
// Bearer Token Extractor
// =============================================================================

/// Extractor for the raw bearer token of a request.
///
/// Only checks that an `Authorization: Bearer <token>` header is present.
/// Verification is left to the gateway so that every rejection goes through
/// the same path. Returns 401 if the header is missing or uses another scheme.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, BearerToken(token): BearerToken) {
///     let ctx = state.gateway.authenticate(&token).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Parses the value of an `Authorization` header.
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then(|| BearerToken(token.to_string()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BearerToken::parse)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads with uniform error reporting.
///
/// Rejections become a 400 with the standard error body instead of axum's
/// plain-text response.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Tests
// =============================================================================
