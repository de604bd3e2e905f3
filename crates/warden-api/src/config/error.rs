// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a [`WardenConfig`](super::WardenConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("Config file {} does not exist", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The config file exists but could not be read.
    #[error("Cannot read config file {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension names no supported format.
    #[error("Unsupported config extension '{extension}' (expected yaml, yml, toml or json)")]
    UnsupportedFormat {
        /// Offending extension.
        extension: String,
    },

    /// The document is not valid for its format or does not fit the schema.
    #[error("Invalid {format} in {origin}: {message}")]
    Syntax {
        /// File path, or `<inline>` for string input.
        origin: String,
        /// Format name.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// A `WARDEN_*` override could not be applied.
    #[error("Environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// What was expected.
        message: String,
    },

    /// A loaded value breaks a constraint.
    #[error("{field}: {message}")]
    Validation {
        /// Dotted field path, e.g. `token.secret`.
        field: String,
        /// Constraint description.
        message: String,
    },
}

impl ConfigError {
    /// Creates a validation error for a dotted field path.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an environment override error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn syntax(
        origin: impl Into<String>,
        format: &'static str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Syntax {
            origin: origin.into(),
            format,
            message: message.to_string(),
        }
    }

    /// Returns the offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
