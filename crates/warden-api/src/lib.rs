// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! Role-based access control over users and products.
//!
//! - [`auth::TokenService`] issues and verifies signed, expiring tokens.
//! - [`auth::PermissionEngine`] answers whether a role may perform an
//!   operation on a resource type.
//! - [`gateway::ResourceGateway`] combines both in front of a
//!   [`warden_core::ResourceStore`].
//! - [`server`] exposes the gateway over HTTP with axum.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    Authorizer, Claims, Decision, PermissionEngine, TokenConfig, TokenError, TokenService,
};
pub use config::{ConfigLoader, WardenConfig};
pub use error::{ApiError, ApiResult};
pub use gateway::{GatewayConfig, GatewayError, Outcome, ResourceGateway, RoleSource};
pub use server::{create_router, ApiServer};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
