// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authenticated caller context.

use serde::Serialize;
use uuid::Uuid;
use warden_core::{Role, UserId};

use super::Claims;

/// Identity of a verified caller for one gateway call.
///
/// Built from verified claims; `role` is the effective role after the
/// configured role source has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// User ID.
    pub user_id: UserId,
    /// Username at issuance.
    pub username: String,
    /// Effective role.
    pub role: Role,
    /// ID of the presented token.
    pub token_id: String,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context from verified claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            role: claims.role,
            token_id: claims.jti.clone(),
            request_id: Uuid::now_v7(),
        }
    }

    /// Replaces the effective role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Returns `true` if the effective role is admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
