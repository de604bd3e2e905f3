// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Liveness endpoint
//! - [`auth`]: Token issuance and account endpoints
//! - [`products`]: Product endpoints
//! - [`users`]: User management endpoints

mod auth;
mod health;
mod products;
mod users;

pub use auth::*;
pub use health::*;
pub use products::*;
pub use users::*;
