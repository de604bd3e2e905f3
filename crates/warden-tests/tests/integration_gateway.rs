// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gateway Integration Tests
//!
//! - `test_table_*`: the permission table, exhaustively
//! - `test_pipeline_*`: verification, authorization, validation, execution order
//! - `test_role_source_*`: token versus store role resolution
//! - `test_account_*`: current user and password change

use std::sync::Arc;

use serde_json::{json, Value};
use warden_api::{
    Authorizer, Decision, GatewayConfig, GatewayError, Outcome, PermissionEngine, ResourceGateway,
    RoleSource, TokenService,
};
use warden_core::{
    seed_demo, MemoryStore, Operation, ResourceStore, ResourceType, Role, SeedConfig, UserPatch,
};
use warden_tests::prelude::*;

// =============================================================================
// Permission table
// =============================================================================

const GRANTED: &[(Role, ResourceType, Operation)] = &[
    (Role::Admin, ResourceType::User, Operation::Create),
    (Role::Admin, ResourceType::User, Operation::Update),
    (Role::Admin, ResourceType::User, Operation::Delete),
    (Role::Admin, ResourceType::User, Operation::List),
    (Role::Admin, ResourceType::Product, Operation::Create),
    (Role::Admin, ResourceType::Product, Operation::Update),
    (Role::Admin, ResourceType::Product, Operation::Delete),
    (Role::Admin, ResourceType::Product, Operation::List),
    (Role::User, ResourceType::Product, Operation::List),
    (Role::User, ResourceType::Product, Operation::Read),
];

#[test]
fn test_table_all_twenty_combinations() {
    let engine = PermissionEngine::standard();
    let mut checked = 0;

    for &role in Role::all() {
        for &resource in ResourceType::all() {
            for &operation in Operation::all() {
                let expected = if GRANTED.contains(&(role, resource, operation)) {
                    Decision::Allow
                } else {
                    Decision::Deny
                };
                assert_eq!(
                    engine.decide(role, resource, operation),
                    expected,
                    "{} {} {}",
                    role,
                    resource,
                    operation
                );
                checked += 1;
            }
        }
    }
    assert_eq!(checked, 20);
    assert_eq!(engine.rules().len(), GRANTED.len());
}

#[test]
fn test_table_unknown_names_deny() {
    let engine = PermissionEngine::standard();
    assert_eq!(engine.decide_named("admin", "product", "create"), Decision::Allow);
    assert_eq!(engine.decide_named("root", "product", "create"), Decision::Deny);
    assert_eq!(engine.decide_named("admin", "order", "create"), Decision::Deny);
    assert_eq!(engine.decide_named("admin", "product", "purge"), Decision::Deny);
    assert_eq!(engine.decide_named("", "", ""), Decision::Deny);
}

// =============================================================================
// Pipeline
// =============================================================================

#[tokio::test]
async fn test_pipeline_admin_creates_widget() {
    init_test_logging();
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;

    let outcome = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Create,
            &json!({"name": "Widget", "price": 9.99}),
        )
        .await
        .unwrap();
    let created = match outcome {
        Outcome::Created(body) => body,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(created["name"], "Widget");
    assert_eq!(created["price"], 9.99);
    assert_eq!(created["category"], "general");

    let stored = fx.store.list_products().await.unwrap();
    assert!(stored.iter().any(|p| p.name == "Widget" && p.price == 9.99));
}

#[tokio::test]
async fn test_pipeline_user_cannot_delete_users() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;
    let owner_id = fx.user_id(ADMIN_USERNAME).await;
    fx.store.reset();

    let result = fx
        .gateway
        .handle(
            &user,
            ResourceType::User,
            Operation::Delete,
            &json!({"id": owner_id.to_string()}),
        )
        .await;

    assert!(matches!(
        result,
        Err(GatewayError::Forbidden {
            role: Role::User,
            resource: ResourceType::User,
            operation: Operation::Delete,
        })
    ));
    assert_eq!(fx.authorizer.calls(), 1);
    assert_eq!(fx.store.call_count(), 0);
}

#[tokio::test]
async fn test_pipeline_garbage_token_touches_nothing() {
    let fx = Fixture::seeded().await;

    let result = fx
        .gateway
        .handle("garbage", ResourceType::Product, Operation::List, &json!({}))
        .await;

    assert!(matches!(result, Err(GatewayError::Unauthenticated)));
    assert_eq!(fx.authorizer.calls(), 0);
    assert_eq!(fx.store.call_count(), 0);
}

#[tokio::test]
async fn test_pipeline_validation_before_store() {
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;
    fx.store.reset();

    let result = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Create,
            &json!({"name": "", "price": -1}),
        )
        .await;

    match result {
        Err(GatewayError::Validation(errors)) => {
            assert!(errors.has_field("name"));
            assert!(errors.has_field("price"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(fx.authorizer.calls(), 1);
    assert_eq!(fx.store.call_count(), 0);
}

#[tokio::test]
async fn test_pipeline_authorization_before_validation() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;

    // Invalid payload, but the role check fails first.
    let result = fx
        .gateway
        .handle(&user, ResourceType::Product, Operation::Create, &Value::Null)
        .await;
    assert!(matches!(result, Err(GatewayError::Forbidden { .. })));
}

#[tokio::test]
async fn test_pipeline_user_reads_and_lists_products() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;
    let id = fx.first_product_id().await;

    let listed = fx
        .gateway
        .handle(&user, ResourceType::Product, Operation::List, &Value::Null)
        .await
        .unwrap();
    assert!(matches!(listed, Outcome::Listed(ref items) if items.len() == 5));

    let found = fx
        .gateway
        .handle(
            &user,
            ResourceType::Product,
            Operation::Read,
            &json!({"id": id.to_string()}),
        )
        .await
        .unwrap();
    match found {
        Outcome::Found(body) => assert_eq!(body["id"], id.to_string()),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_pipeline_admin_product_read_is_denied() {
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;
    let id = fx.first_product_id().await;

    let result = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Read,
            &json!({"id": id.to_string()}),
        )
        .await;
    assert!(matches!(result, Err(GatewayError::Forbidden { .. })));
}

#[tokio::test]
async fn test_pipeline_missing_product_is_not_found() {
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;
    let missing = warden_core::ProductId::new();

    let result = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Delete,
            &json!({"id": missing.to_string()}),
        )
        .await;
    match result {
        Err(GatewayError::NotFound { resource, id }) => {
            assert_eq!(resource, ResourceType::Product);
            assert_eq!(id, missing.to_string());
        }
        other => panic!("expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pipeline_product_update_and_delete() {
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;
    let id = fx.first_product_id().await;

    let updated = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Update,
            &json!({"id": id.to_string(), "price": 42.5, "quantity": 3}),
        )
        .await
        .unwrap();
    match updated {
        Outcome::Updated(body) => {
            assert_eq!(body["price"], 42.5);
            assert_eq!(body["quantity"], 3);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let empty_update = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Update,
            &json!({"id": id.to_string()}),
        )
        .await;
    assert!(matches!(empty_update, Err(GatewayError::Validation(_))));

    let deleted = fx
        .gateway
        .handle(
            &admin,
            ResourceType::Product,
            Operation::Delete,
            &json!({"id": id.to_string()}),
        )
        .await
        .unwrap();
    assert_eq!(deleted, Outcome::Deleted);
    assert!(fx.store.get_product(&id).await.is_err());
}

#[tokio::test]
async fn test_pipeline_user_management() {
    let fx = Fixture::seeded().await;
    let admin = fx.admin_token().await;

    let created = fx
        .gateway
        .handle(
            &admin,
            ResourceType::User,
            Operation::Create,
            &json!({"username": "clerk", "password": "counting-beans", "role": "admin"}),
        )
        .await
        .unwrap();
    let body = match created {
        Outcome::Created(body) => body,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(body["role"], "admin");
    assert!(body.get("password_hash").is_none());

    let duplicate = fx
        .gateway
        .handle(
            &admin,
            ResourceType::User,
            Operation::Create,
            &json!({"username": "clerk", "password": "another-secret"}),
        )
        .await;
    assert!(matches!(duplicate, Err(GatewayError::Conflict(_))));

    let weak = fx
        .gateway
        .handle(
            &admin,
            ResourceType::User,
            Operation::Create,
            &json!({"username": "digits", "password": "12345678"}),
        )
        .await;
    match weak {
        Err(GatewayError::Validation(errors)) => assert!(errors.has_field("password")),
        other => panic!("expected validation error, got {:?}", other),
    }

    // The new account can sign in with its own password.
    let clerk = fx.token_for("clerk", "counting-beans").await;
    assert!(fx.tokens.verify(&clerk).is_ok());

    let listed = fx
        .gateway
        .handle(&admin, ResourceType::User, Operation::List, &Value::Null)
        .await
        .unwrap();
    match listed {
        Outcome::Listed(users) => {
            assert_eq!(users.len(), 3);
            assert!(users.iter().all(|u| u.get("password_hash").is_none()));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_pipeline_store_failure_is_internal() {
    let memory = MemoryStore::new();
    let hasher = fast_hasher();
    seed_demo(&memory, &hasher, &SeedConfig::default())
        .await
        .unwrap();

    let store = Arc::new(FailingStore::new(memory));
    let tokens = TokenService::new(token_config(), store.clone(), hasher.clone()).unwrap();
    let gateway = ResourceGateway::new(
        tokens.clone(),
        Arc::new(PermissionEngine::standard()),
        store,
        hasher,
        GatewayConfig::default(),
    );

    let admin = tokens
        .issue(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .unwrap()
        .access_token;
    let result = gateway
        .handle(&admin, ResourceType::Product, Operation::List, &Value::Null)
        .await;
    assert!(matches!(result, Err(GatewayError::Internal(_))));
}

#[tokio::test]
async fn test_pipeline_custom_authorizer() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;

    let open = PermissionEngine::builder()
        .allow(Role::User, ResourceType::User, Operation::List)
        .build();
    let gateway = ResourceGateway::new(
        fx.tokens.clone(),
        Arc::new(open),
        fx.store.clone(),
        fx.hasher.clone(),
        GatewayConfig::default(),
    );

    let listed = gateway
        .handle(&user, ResourceType::User, Operation::List, &Value::Null)
        .await;
    assert!(matches!(listed, Ok(Outcome::Listed(_))));

    let products = gateway
        .handle(&user, ResourceType::Product, Operation::List, &Value::Null)
        .await;
    assert!(matches!(products, Err(GatewayError::Forbidden { .. })));
}

// =============================================================================
// Role source
// =============================================================================

async fn demote(fx: &Fixture, username: &str) {
    let id = fx.user_id(username).await;
    fx.store
        .update_user(
            &id,
            UserPatch {
                role: Some(Role::User),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_role_source_token_trusts_claim() {
    let fx = Fixture::with_role_source(RoleSource::Token).await;
    let admin = fx.admin_token().await;
    demote(&fx, ADMIN_USERNAME).await;

    let result = fx
        .gateway
        .handle(&admin, ResourceType::User, Operation::List, &Value::Null)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_role_source_store_uses_live_role() {
    let fx = Fixture::with_role_source(RoleSource::Store).await;
    let admin = fx.admin_token().await;
    demote(&fx, ADMIN_USERNAME).await;

    let result = fx
        .gateway
        .handle(&admin, ResourceType::User, Operation::List, &Value::Null)
        .await;
    assert!(matches!(
        result,
        Err(GatewayError::Forbidden { role: Role::User, .. })
    ));
}

#[tokio::test]
async fn test_role_source_store_rejects_deleted_subject() {
    let fx = Fixture::with_role_source(RoleSource::Store).await;
    let user = fx.user_token().await;
    let id = fx.user_id(USER_USERNAME).await;
    fx.store.delete_user(&id).await.unwrap();

    let result = fx
        .gateway
        .handle(&user, ResourceType::Product, Operation::List, &Value::Null)
        .await;
    assert!(matches!(result, Err(GatewayError::Unauthenticated)));
    assert_eq!(fx.authorizer.calls(), 0);
}

// =============================================================================
// Account operations
// =============================================================================

#[tokio::test]
async fn test_account_current_user() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;

    let view = fx.gateway.current_user(&user).await.unwrap();
    assert_eq!(view.username, USER_USERNAME);
    assert_eq!(view.role, Role::User);

    assert!(matches!(
        fx.gateway.current_user("x.y.z").await,
        Err(GatewayError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_account_change_password() {
    let fx = Fixture::seeded().await;
    let user = fx.user_token().await;

    let wrong = fx
        .gateway
        .change_password(&user, "not-my-password", "a-brand-new-pass")
        .await;
    match wrong {
        Err(GatewayError::Validation(errors)) => assert!(errors.has_field("current_password")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let same = fx
        .gateway
        .change_password(&user, USER_PASSWORD, USER_PASSWORD)
        .await;
    match same {
        Err(GatewayError::Validation(errors)) => assert!(errors.has_field("new_password")),
        other => panic!("expected validation error, got {:?}", other),
    }

    fx.gateway
        .change_password(&user, USER_PASSWORD, "a-brand-new-pass")
        .await
        .unwrap();

    assert!(fx.tokens.issue(USER_USERNAME, USER_PASSWORD).await.is_err());
    assert!(fx.tokens.issue(USER_USERNAME, "a-brand-new-pass").await.is_ok());
}
