// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{Role, User, UserId};

/// Purpose of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new access token.
    Refresh,
}

impl TokenKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried in every signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the user ID.
    pub sub: UserId,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    pub iss: String,

    /// Token ID.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Role at issuance.
    pub role: Role,

    /// Username at issuance.
    pub username: String,

    /// Token purpose.
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for a user, valid from `now` for `ttl_secs`.
    pub fn for_user(
        user: &User,
        kind: TokenKind,
        issuer: impl Into<String>,
        now: i64,
        ttl_secs: i64,
    ) -> Self {
        Self {
            sub: user.id,
            iat: now,
            exp: now + ttl_secs,
            iss: issuer.into(),
            jti: Uuid::now_v7().to_string(),
            role: user.role,
            username: user.username.clone(),
            kind,
        }
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> &UserId {
        &self.sub
    }

    /// Returns `true` if the token is expired at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the seconds between issuance and expiry.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(),
            username: "owner".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            email: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_claims_for_user() {
        let user = user();
        let claims = Claims::for_user(&user, TokenKind::Access, "warden", 1_000, 3_600);

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, 4_600);
        assert_eq!(claims.lifetime_secs(), 3_600);
        assert!(!claims.is_expired_at(4_600));
        assert!(claims.is_expired_at(4_601));
    }

    #[test]
    fn test_claims_wire_shape() {
        let claims = Claims::for_user(&user(), TokenKind::Refresh, "warden", 0, 60);
        let value = serde_json::to_value(&claims).unwrap();

        for field in ["sub", "role", "username", "kind", "iat", "exp", "iss", "jti"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(value["kind"], "refresh");
        assert_eq!(value["role"], "admin");
    }

    #[test]
    fn test_jti_is_unique() {
        let user = user();
        let a = Claims::for_user(&user, TokenKind::Access, "warden", 0, 60);
        let b = Claims::for_user(&user, TokenKind::Access, "warden", 0, 60);
        assert_ne!(a.jti, b.jti);
    }
}
