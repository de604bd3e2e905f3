// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the storage and credential layer.
//!
//! ```text
//! StoreError      - Resource and credential store operations
//! PasswordError   - Password hashing and verification
//! ```

use thiserror::Error;

use crate::types::ResourceType;

// =============================================================================
// StoreError
// =============================================================================

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Resource type.
        resource: ResourceType,
        /// Identifier that was looked up.
        id: String,
    },

    /// A uniqueness constraint would be violated.
    #[error("{resource} conflict on '{field}': {value} already exists")]
    Conflict {
        /// Resource type.
        resource: ResourceType,
        /// Field carrying the unique constraint.
        field: String,
        /// Offending value.
        value: String,
    },

    /// The underlying storage failed.
    #[error("Store backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(resource: ResourceType, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(
        resource: ResourceType,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            resource,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Backend { .. } => "backend",
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// PasswordError
// =============================================================================

/// Errors from password hashing.
///
/// A wrong password is not an error: [`crate::password::CredentialHasher::verify`]
/// returns `Ok(false)` for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Hashing parameters were rejected.
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Salt generation failed.
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    /// Hashing itself failed.
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}
