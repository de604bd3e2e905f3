// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `warden` binary.
//!
//! Exit codes follow `sysexits.h` so scripts can tell a bad invocation from
//! a bad config file or a rejected login.

use thiserror::Error;
use warden_api::config::ConfigError;
use warden_api::{ApiError, TokenError};
use warden_core::{PasswordError, SeedError};

/// Result type alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;

/// `EX_USAGE`
pub const EXIT_USAGE: i32 = 64;
/// `EX_UNAVAILABLE`
pub const EXIT_UNAVAILABLE: i32 = 69;
/// `EX_SOFTWARE`
pub const EXIT_SOFTWARE: i32 = 70;
/// `EX_IOERR`
pub const EXIT_IO: i32 = 74;
/// `EX_NOPERM`
pub const EXIT_NOPERM: i32 = 77;
/// `EX_CONFIG`
pub const EXIT_CONFIG: i32 = 78;

/// Errors surfaced by `warden` commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// The command line was well formed but unusable.
    #[error("{0}")]
    Usage(String),

    /// The configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration loaded but fails a stricter check.
    #[error("Configuration rejected: {0}")]
    Rejected(String),

    /// Logging, hashing or store setup failed before serving.
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Demo data could not be seeded.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Credentials were rejected or a token could not be signed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Server(#[from] ApiError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command output could not be rendered.
    #[error("Cannot render output: {0}")]
    Output(String),

    /// An error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a startup error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Creates an output rendering error.
    pub fn output(err: impl std::fmt::Display) -> Self {
        Self::Output(err.to_string())
    }

    /// Wraps the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Config(_) | Self::Rejected(_) => EXIT_CONFIG,
            Self::Token(e) if !matches!(e, TokenError::Internal(_) | TokenError::Store(_)) => {
                EXIT_NOPERM
            }
            Self::Server(_) => EXIT_UNAVAILABLE,
            Self::Io(_) => EXIT_IO,
            Self::WithContext { source, .. } => source.exit_code(),
            Self::Startup(_)
            | Self::Seed(_)
            | Self::Password(_)
            | Self::Token(_)
            | Self::Output(_) => EXIT_SOFTWARE,
        }
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<std::io::Error>() {
            Ok(io) => Self::Io(io),
            Err(other) => Self::Startup(format!("{:#}", other)),
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints the error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
