// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Token Integration Tests
//!
//! - `test_issue_*`: credential checks and claim contents
//! - `test_verify_*`: expiry, tampering, foreign keys
//! - `test_refresh_*`: refresh token exchange

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use warden_api::{TokenConfig, TokenError, TokenService};
use warden_core::{ResourceStore, Role, UserPatch};
use warden_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

/// Replaces the payload segment of a token.
fn with_payload(token: &str, payload: &[u8]) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode(payload), parts[2])
}

fn payload_bytes(token: &str) -> Vec<u8> {
    let payload = token.split('.').nth(1).expect("token has a payload");
    URL_SAFE_NO_PAD.decode(payload).expect("payload is base64url")
}

fn service_with(config: TokenConfig, fx: &Fixture) -> TokenService {
    TokenService::new(config, fx.store.clone(), fx.hasher.clone()).unwrap()
}

// =============================================================================
// Issuance
// =============================================================================

#[tokio::test]
async fn test_issue_embeds_stored_role() {
    let fx = Fixture::seeded().await;

    let admin = fx.tokens.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    let claims = fx.tokens.verify(&admin.access_token).unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.username, ADMIN_USERNAME);
    assert_eq!(claims.sub, fx.user_id(ADMIN_USERNAME).await);
    assert!(admin.refresh_token.is_some());

    let user = fx.tokens.issue(USER_USERNAME, USER_PASSWORD).await.unwrap();
    assert_eq!(fx.tokens.verify(&user.access_token).unwrap().role, Role::User);
}

#[tokio::test]
async fn test_issue_rejects_bad_credentials_uniformly() {
    let fx = Fixture::seeded().await;

    let wrong_password = fx.tokens.issue(ADMIN_USERNAME, "not-the-password").await;
    let unknown_user = fx.tokens.issue("nobody", ADMIN_PASSWORD).await;

    assert!(matches!(wrong_password, Err(TokenError::InvalidCredentials)));
    assert!(matches!(unknown_user, Err(TokenError::InvalidCredentials)));
    assert_eq!(
        wrong_password.unwrap_err().to_string(),
        unknown_user.unwrap_err().to_string()
    );
}

#[tokio::test]
async fn test_issue_usernames_are_case_sensitive() {
    let fx = Fixture::seeded().await;
    let result = fx.tokens.issue("OWNER", ADMIN_PASSWORD).await;
    assert!(matches!(result, Err(TokenError::InvalidCredentials)));
}

#[tokio::test]
async fn test_issue_token_shape() {
    let fx = Fixture::seeded().await;
    let now = Utc::now().timestamp();
    let issued = fx
        .tokens
        .issue_at(USER_USERNAME, USER_PASSWORD, now)
        .await
        .unwrap();

    assert_eq!(issued.access_token.split('.').count(), 3);
    assert_eq!(issued.claims.iat, now);
    assert_eq!(issued.claims.exp, now + fx.tokens.access_ttl_secs());
    assert_eq!(issued.expires_in, fx.tokens.access_ttl_secs());

    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes(&issued.access_token)).unwrap();
    for field in ["sub", "role", "username", "kind", "iat", "exp", "iss", "jti"] {
        assert!(payload.get(field).is_some(), "missing claim {}", field);
    }
    assert_eq!(payload["role"], "user");
    assert_eq!(payload["kind"], "access");
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn test_verify_is_deterministic() {
    let fx = Fixture::seeded().await;
    let token = fx.user_token().await;

    let first = fx.tokens.verify(&token).unwrap();
    for _ in 0..5 {
        assert_eq!(fx.tokens.verify(&token).unwrap(), first);
    }
}

#[tokio::test]
async fn test_verify_expiry_boundary() {
    let fx = Fixture::seeded().await;
    let now = Utc::now().timestamp();
    let issued = fx
        .tokens
        .issue_at(USER_USERNAME, USER_PASSWORD, now)
        .await
        .unwrap();
    let exp = issued.claims.exp;

    assert!(fx.tokens.verify_at(&issued.access_token, exp).is_ok());
    assert!(matches!(
        fx.tokens.verify_at(&issued.access_token, exp + 1),
        Err(TokenError::Expired)
    ));
}

#[tokio::test]
async fn test_verify_expired_wins_over_bad_signature() {
    let fx = Fixture::seeded().await;
    let now = Utc::now().timestamp();
    let issued = fx
        .tokens
        .issue_at(USER_USERNAME, USER_PASSWORD, now)
        .await
        .unwrap();

    let forged = {
        let parts: Vec<&str> = issued.access_token.split('.').collect();
        let mut signature = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
        signature[0] ^= 0x01;
        format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(signature))
    };

    let later = issued.claims.exp + 60;
    assert!(matches!(
        fx.tokens.verify_at(&forged, later),
        Err(TokenError::Expired)
    ));
    assert!(matches!(
        fx.tokens.verify_at(&forged, now),
        Err(TokenError::BadSignature)
    ));
}

#[tokio::test]
async fn test_verify_rejects_role_escalation() {
    let fx = Fixture::seeded().await;
    let token = fx.user_token().await;

    let payload = String::from_utf8(payload_bytes(&token)).unwrap();
    let escalated = payload.replace("\"role\":\"user\"", "\"role\":\"admin\"");
    assert_ne!(payload, escalated);

    let forged = with_payload(&token, escalated.as_bytes());
    assert!(matches!(fx.tokens.verify(&forged), Err(TokenError::BadSignature)));
}

#[tokio::test]
async fn test_verify_single_bit_payload_flip() {
    let fx = Fixture::seeded().await;
    let now = Utc::now().timestamp();
    let token = fx
        .tokens
        .issue_at(USER_USERNAME, USER_PASSWORD, now)
        .await
        .unwrap()
        .access_token;
    let payload = payload_bytes(&token);

    let mut expired = 0;
    for index in 0..payload.len() {
        for bit in 0..8 {
            let mut mutated = payload.clone();
            mutated[index] ^= 1 << bit;

            // Only a flip that leaves readable claims with an earlier expiry
            // may report anything but a bad signature.
            let lowered_exp = serde_json::from_slice::<serde_json::Value>(&mutated)
                .ok()
                .and_then(|claims| claims["exp"].as_i64())
                .is_some_and(|exp| now > exp);

            let result = fx.tokens.verify_at(&with_payload(&token, &mutated), now);
            if lowered_exp {
                expired += 1;
                assert!(
                    matches!(result, Err(TokenError::Expired)),
                    "byte {} bit {}: {:?}",
                    index,
                    bit,
                    result
                );
            } else {
                assert!(
                    matches!(result, Err(TokenError::BadSignature)),
                    "byte {} bit {}: {:?}",
                    index,
                    bit,
                    result
                );
            }
        }
    }
    assert!(expired > 0);
}

#[tokio::test]
async fn test_verify_unreadable_payload_is_bad_signature() {
    let fx = Fixture::seeded().await;
    let token = fx.user_token().await;

    for payload in [&b"{"[..], &b"not json at all"[..], &b"\xff\xfe"[..], &b"{}"[..]] {
        assert!(
            matches!(
                fx.tokens.verify(&with_payload(&token, payload)),
                Err(TokenError::BadSignature)
            ),
            "{:?}",
            payload
        );
    }
}

#[tokio::test]
async fn test_verify_garbage_is_malformed() {
    let fx = Fixture::seeded().await;
    for garbage in ["", "garbage", "a.b", "a.b.c", "Bearer x.y.z", "...."] {
        assert!(
            matches!(fx.tokens.verify(garbage), Err(TokenError::Malformed)),
            "{:?} was not malformed",
            garbage
        );
    }
}

#[tokio::test]
async fn test_verify_foreign_secret_is_bad_signature() {
    let fx = Fixture::seeded().await;
    let other = service_with(
        TokenConfig::new("a-completely-different-secret-of-decent-size").with_issuer("warden-tests"),
        &fx,
    );

    let token = other.issue(USER_USERNAME, USER_PASSWORD).await.unwrap().access_token;
    assert!(other.verify(&token).is_ok());
    assert!(matches!(fx.tokens.verify(&token), Err(TokenError::BadSignature)));
}

#[tokio::test]
async fn test_verify_shared_secret_across_instances() {
    let fx = Fixture::seeded().await;
    let twin = service_with(token_config(), &fx);

    let token = twin.issue(USER_USERNAME, USER_PASSWORD).await.unwrap().access_token;
    assert_eq!(
        fx.tokens.verify(&token).unwrap(),
        twin.verify(&token).unwrap()
    );
}

#[tokio::test]
async fn test_verify_foreign_issuer_is_malformed() {
    let fx = Fixture::seeded().await;
    let other = service_with(TokenConfig::new(TEST_SECRET).with_issuer("someone-else"), &fx);

    let token = other.issue(USER_USERNAME, USER_PASSWORD).await.unwrap().access_token;
    assert!(matches!(fx.tokens.verify(&token), Err(TokenError::Malformed)));
}

#[tokio::test]
async fn test_verify_refresh_token_is_not_an_access_token() {
    let fx = Fixture::seeded().await;
    let issued = fx.tokens.issue(USER_USERNAME, USER_PASSWORD).await.unwrap();
    let refresh = issued.refresh_token.unwrap();

    assert!(matches!(fx.tokens.verify(&refresh), Err(TokenError::Malformed)));
    assert!(matches!(
        fx.tokens.refresh(&issued.access_token).await,
        Err(TokenError::Malformed)
    ));
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_rereads_role() {
    let fx = Fixture::seeded().await;
    let issued = fx.tokens.issue(USER_USERNAME, USER_PASSWORD).await.unwrap();
    let refresh = issued.refresh_token.unwrap();

    let id = fx.user_id(USER_USERNAME).await;
    fx.store
        .update_user(
            &id,
            UserPatch {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reissued = fx.tokens.refresh(&refresh).await.unwrap();
    assert!(reissued.refresh_token.is_none());
    assert_eq!(fx.tokens.verify(&reissued.access_token).unwrap().role, Role::Admin);
    // The original access token keeps its issued role until it expires.
    assert_eq!(fx.tokens.verify(&issued.access_token).unwrap().role, Role::User);
}

#[tokio::test]
async fn test_refresh_for_deleted_user_fails() {
    let fx = Fixture::seeded().await;
    let refresh = fx
        .tokens
        .issue(USER_USERNAME, USER_PASSWORD)
        .await
        .unwrap()
        .refresh_token
        .unwrap();

    let id = fx.user_id(USER_USERNAME).await;
    fx.store.delete_user(&id).await.unwrap();

    assert!(matches!(
        fx.tokens.refresh(&refresh).await,
        Err(TokenError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_config_rejects_empty_secret() {
    let fx = Fixture::seeded().await;
    let result = TokenService::new(TokenConfig::new(""), fx.store.clone(), fx.hasher.clone());
    assert!(matches!(result, Err(TokenError::Config(_))));
}

#[tokio::test]
async fn test_services_share_store_handle() {
    let fx = Fixture::seeded().await;
    let shared: Arc<dyn warden_core::CredentialStore> = fx.store.clone();
    let service = TokenService::new(token_config(), shared, fast_hasher()).unwrap();
    assert!(service.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.is_ok());
}
