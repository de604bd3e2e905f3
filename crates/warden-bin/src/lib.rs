// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! CLI binary for the Warden access control service.
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration and demo seeding
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! WARDEN_SECRET=... warden
//!
//! # Start with custom config
//! warden -c /etc/warden/warden.yaml serve --port 9000
//!
//! # Validate configuration
//! warden validate --show-config
//!
//! # Hash a password for a config or fixture
//! warden hash-password 'correct horse'
//!
//! # Issue a token against the seeded accounts
//! warden issue-token --username owner
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, WardenRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
