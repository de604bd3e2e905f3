// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP-facing errors.
//!
//! Every failure leaving a handler is an [`ApiError`]: an [`ErrorKind`] that
//! fixes the status code, a message, and optional per-field details. The
//! response body is always
//!
//! ```json
//! {"error": {"code": "VALIDATION_ERROR", "message": "...", "details": {...}}}
//! ```
//!
//! Internal messages are logged, never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::TokenError;
use crate::gateway::GatewayError;

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ErrorKind
// =============================================================================

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unparseable request (400).
    BadRequest,
    /// Payload failed field validation (400).
    Validation,
    /// Missing or rejected credentials (401).
    Unauthorized,
    /// Permission table denied the operation (403).
    Forbidden,
    /// Addressed entity does not exist (404).
    NotFound,
    /// Uniqueness violation (409).
    Conflict,
    /// Anything the client cannot fix (500).
    Internal,
}

impl ErrorKind {
    /// HTTP status for the kind.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the body.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

// =============================================================================
// ApiError
// =============================================================================

/// An error rendered as an HTTP response.
#[derive(Debug, Error)]
#[error("{}: {message}", kind.code())]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    details: Option<ValidationErrors>,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// 404 for the described entity, e.g. `product '0190...'`.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{} not found", what))
    }

    /// 400 for a request that could not be parsed.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 401.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 403. The message is logged; clients see "Access denied".
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// 400 carrying per-field errors.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: "Validation failed".to_string(),
            details: Some(errors),
        }
    }

    /// 409.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// 500. The message is logged; clients see a generic text.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns the category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.kind.status()
    }

    /// Returns the per-field errors, if any.
    pub fn details(&self) -> Option<&ValidationErrors> {
        self.details.as_ref()
    }

    /// Returns the message sent to the client.
    pub fn user_message(&self) -> &str {
        match self.kind {
            ErrorKind::Forbidden => "Access denied",
            ErrorKind::Internal => "Internal server error",
            _ => &self.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.kind == ErrorKind::Internal {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: self.kind.code().to_string(),
                message: self.user_message().to_string(),
                details: self
                    .details
                    .as_ref()
                    .and_then(|d| serde_json::to_value(d).ok()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error payload.
    pub error: ErrorDetails,
}

/// Contents of [`ErrorResponseBody`].
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// One of the [`ErrorKind::code`] values.
    pub code: String,
    /// Client-safe message.
    pub message: String,
    /// Per-field errors for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// ValidationErrors
// =============================================================================

/// Per-field validation failures, in the order they were found.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Failures.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding one error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a failure for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if the given field has an error.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// Returns `Ok(success)` when empty, the errors otherwise.
    pub fn into_result<T>(self, success: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(self)
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid {}", fields.join(", "))
    }
}

/// One field failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    /// Payload field name.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

// =============================================================================
// Conversions
// =============================================================================

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthenticated => ApiError::unauthorized("Authentication required"),
            GatewayError::Forbidden { .. } => ApiError::forbidden(err.to_string()),
            GatewayError::NotFound { resource, id } => {
                ApiError::not_found(format!("{} '{}'", resource, id))
            }
            GatewayError::Validation(errors) => ApiError::validation(errors),
            GatewayError::Conflict(message) => ApiError::conflict(message),
            GatewayError::Internal(message) => ApiError::internal(message),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        if err.is_verification_failure() {
            tracing::debug!(kind = err.error_type(), "Token rejected");
            return ApiError::unauthorized("Invalid or expired token");
        }
        match err {
            TokenError::InvalidCredentials => ApiError::unauthorized("Invalid username or password"),
            other => ApiError::internal(other.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Operation, ResourceType, Role};

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(ApiError::not_found("product").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("invalid").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("no token").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("no access").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::validation(ValidationErrors::single("name", "empty")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::conflict("taken").status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::internal("crash").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_gateway_error_mapping() {
        let forbidden: ApiError = GatewayError::Forbidden {
            role: Role::User,
            resource: ResourceType::User,
            operation: Operation::Delete,
        }
        .into();
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(forbidden.user_message(), "Access denied");

        let unauthenticated: ApiError = GatewayError::Unauthenticated.into();
        assert_eq!(unauthenticated.status_code(), StatusCode::UNAUTHORIZED);

        let validation: ApiError =
            GatewayError::Validation(ValidationErrors::single("price", "must be >= 0")).into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(validation.details().is_some_and(|d| d.has_field("price")));
    }

    #[test]
    fn test_token_error_mapping_hides_kind() {
        let expired: ApiError = TokenError::Expired.into();
        let bad_sig: ApiError = TokenError::BadSignature.into();
        assert_eq!(expired.user_message(), bad_sig.user_message());
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_message_not_exposed() {
        let err = ApiError::internal("lock poisoned at memory.rs");
        assert_eq!(err.user_message(), "Internal server error");
        assert!(err.to_string().contains("lock poisoned"));
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "must not be empty");
        errors.add("price", "must be >= 0");
        assert_eq!(errors.to_string(), "invalid name, price");
        assert!(errors.clone().into_result(()).is_err());
        assert!(ValidationErrors::new().into_result(()).is_ok());
    }
}
