// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A [`Fixture`] wires a token service, the standard permission table and a
//! gateway over a seeded [`RecordingStore`]. The seed contains the default
//! admin (`owner`), one `user`-role account (`shopper`) and five demo
//! products. Recorded store calls are cleared after seeding.

use std::sync::Arc;

use axum::Router;
use warden_api::{
    create_router, AppState, GatewayConfig, PermissionEngine, ResourceGateway, RoleSource,
    TokenConfig, TokenService, WardenConfig,
};
use warden_core::{
    seed_demo, CredentialHasher, CredentialStore, HashConfig, NewUser, ProductId, ResourceStore,
    Role, SeedConfig, UserId,
};

use super::mocks::{CountingAuthorizer, RecordingStore};

// =============================================================================
// Constants
// =============================================================================

/// Signing secret shared by every fixture.
pub const TEST_SECRET: &str = "integration-test-secret-with-plenty-of-bytes";

/// Seeded admin username.
pub const ADMIN_USERNAME: &str = "owner";

/// Seeded admin password.
pub const ADMIN_PASSWORD: &str = "owner1234";

/// Seeded user-role username.
pub const USER_USERNAME: &str = "shopper";

/// Seeded user-role password.
pub const USER_PASSWORD: &str = "basket-of-goods";

// =============================================================================
// Configuration fixtures
// =============================================================================

/// Token configuration with the shared test secret.
pub fn token_config() -> TokenConfig {
    TokenConfig::new(TEST_SECRET).with_issuer("warden-tests")
}

/// A hasher with minimal cost.
pub fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(HashConfig::fast()).expect("fast hash parameters are valid")
}

/// Full service configuration for router tests.
pub fn test_config() -> WardenConfig {
    WardenConfig {
        token: token_config(),
        hashing: HashConfig::fast(),
        ..Default::default()
    }
}

// =============================================================================
// Fixture
// =============================================================================

/// A seeded gateway with instrumented seams.
pub struct Fixture {
    /// Store double recording every call.
    pub store: Arc<RecordingStore>,
    /// Authorizer double counting every decision.
    pub authorizer: Arc<CountingAuthorizer>,
    /// Hasher shared by all services.
    pub hasher: CredentialHasher,
    /// Token service over the store.
    pub tokens: TokenService,
    /// Gateway under test.
    pub gateway: ResourceGateway,
}

impl Fixture {
    /// A fixture trusting token claims for the role.
    pub async fn seeded() -> Self {
        Self::with_role_source(RoleSource::Token).await
    }

    /// A fixture resolving roles from the given source.
    pub async fn with_role_source(role_source: RoleSource) -> Self {
        let store = Arc::new(RecordingStore::new());
        let hasher = fast_hasher();

        seed_demo(store.as_ref(), &hasher, &SeedConfig::default())
            .await
            .expect("seeding succeeds");
        store
            .create_user(NewUser {
                username: USER_USERNAME.to_string(),
                password_hash: hasher.hash(USER_PASSWORD).expect("hashing succeeds"),
                role: Role::User,
                email: Some("shopper@example.com".to_string()),
            })
            .await
            .expect("user-role account is created");
        store.reset();

        let authorizer = Arc::new(CountingAuthorizer::new(PermissionEngine::standard()));
        let tokens = TokenService::new(token_config(), store.clone(), hasher.clone())
            .expect("token service builds");
        let gateway = ResourceGateway::new(
            tokens.clone(),
            authorizer.clone(),
            store.clone(),
            hasher.clone(),
            GatewayConfig { role_source },
        );

        Self {
            store,
            authorizer,
            hasher,
            tokens,
            gateway,
        }
    }

    /// Issues an access token for the given credentials.
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        self.tokens
            .issue(username, password)
            .await
            .expect("credentials are valid")
            .access_token
    }

    /// Access token for the seeded admin.
    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Access token for the seeded user-role account.
    pub async fn user_token(&self) -> String {
        self.token_for(USER_USERNAME, USER_PASSWORD).await
    }

    /// Looks up a user's ID by username.
    pub async fn user_id(&self, username: &str) -> UserId {
        self.store
            .find_by_username(username)
            .await
            .expect("lookup succeeds")
            .expect("user exists")
            .id
    }

    /// ID of the first seeded product.
    pub async fn first_product_id(&self) -> ProductId {
        self.store
            .list_products()
            .await
            .expect("listing succeeds")
            .first()
            .expect("demo products are seeded")
            .id
    }

    /// App state sharing this fixture's store and authorizer.
    pub fn app_state(&self) -> AppState {
        AppState::builder()
            .config(test_config())
            .store(self.store.clone())
            .hasher(self.hasher.clone())
            .authorizer(self.authorizer.clone())
            .build()
            .expect("app state builds")
    }

    /// Router over [`Fixture::app_state`].
    pub fn router(&self) -> Router {
        create_router(self.app_state())
    }
}
