// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization.
//!
//! - Token issuance and verification ([`TokenService`])
//! - Role-based permission decisions ([`PermissionEngine`])
//! - Permission definitions
//! - Caller context

mod claims;
mod context;
mod engine;
pub mod permission;
mod token;

pub use claims::{Claims, TokenKind};
pub use context::AuthContext;
pub use engine::{Authorizer, Decision, PermissionEngine, PermissionEngineBuilder, Rule};
pub use permission::{Permission, PermissionSet};
pub use token::{IssuedToken, TokenConfig, TokenError, TokenResult, TokenService};
