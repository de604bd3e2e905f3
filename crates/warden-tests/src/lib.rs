// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Warden Integration Tests
//!
//! Shared fixtures and mocks for the integration suites under `tests/`.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo test -p warden-tests --test integration_token
//! cargo test -p warden-tests --test integration_gateway
//! cargo test -p warden-tests --test integration_http
//! ```
//!
//! ## Test Categories
//!
//! - `integration_token.rs`: issuance, expiry, tampering, refresh
//! - `integration_gateway.rs`: the full permission table, pipeline ordering,
//!   role sources, payload validation
//! - `integration_http.rs`: status codes and bodies through the axum router
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use warden_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let fx = Fixture::seeded().await;
//!     let token = fx.admin_token().await;
//!     // ... test logic
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;
}
