// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::IssuedToken;
use crate::gateway::Outcome;

// =============================================================================
// Outcome
// =============================================================================

impl Outcome {
    /// Returns the HTTP status for this outcome.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Outcome::Created(_) => StatusCode::CREATED,
            Outcome::Found(_) | Outcome::Listed(_) | Outcome::Updated(_) => StatusCode::OK,
            Outcome::Deleted => StatusCode::NO_CONTENT,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.body() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Token issuance response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Expires in seconds.
    pub expires_in: i64,
    /// Refresh token, only on initial issuance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: None,
        }
    }

    /// Adds a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        let response = TokenResponse::new(issued.access_token, issued.expires_in);
        match issued.refresh_token {
            Some(refresh) => response.with_refresh_token(refresh),
            None => response,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Whether the operation was successful.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a success acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Permissions granted to the caller's role.
#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionsResponse {
    /// Effective role.
    pub role: String,
    /// Granted permissions as `resource:operation`.
    pub permissions: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_status() {
        assert_eq!(Outcome::Created(json!({})).status_code(), StatusCode::CREATED);
        assert_eq!(Outcome::Listed(vec![]).status_code(), StatusCode::OK);
        assert_eq!(Outcome::Deleted.status_code(), StatusCode::NO_CONTENT);

        let response = Outcome::Deleted.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_token_response() {
        let response = TokenResponse::new("abc".to_string(), 3600);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["token_type"], "Bearer");
        assert!(value.get("refresh_token").is_none());

        let response = response.with_refresh_token("def".to_string());
        assert_eq!(response.refresh_token.as_deref(), Some("def"));
    }
}
