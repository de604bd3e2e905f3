// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_core::{CredentialHasher, HashConfig, ResourceStore};

use crate::auth::{Authorizer, PermissionEngine, TokenService};
use crate::config::WardenConfig;
use crate::error::{ApiError, ApiResult};
use crate::gateway::ResourceGateway;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<WardenConfig>,
    /// Token service.
    pub tokens: TokenService,
    /// Resource gateway. Its authorizer also answers permission listings.
    pub gateway: ResourceGateway,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &ResourceGateway {
        &self.gateway
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<WardenConfig>,
    store: Option<Arc<dyn ResourceStore>>,
    credentials: Option<Arc<dyn warden_core::CredentialStore>>,
    hasher: Option<CredentialHasher>,
    engine: Option<PermissionEngine>,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the store. The same object serves credential lookups and CRUD.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: ResourceStore + 'static,
    {
        self.credentials = Some(store.clone());
        self.store = Some(store);
        self
    }

    /// Sets the password hasher. Defaults to one built from `config.hashing`.
    pub fn hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Sets the permission table. Defaults to the standard table.
    ///
    /// Ignored when an [`authorizer`](Self::authorizer) is set.
    pub fn engine(mut self, engine: PermissionEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Overrides the authorizer the gateway consults.
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        let (store, credentials) = match (self.store, self.credentials) {
            (Some(store), Some(credentials)) => (store, credentials),
            _ => return Err(ApiError::internal("AppState requires a store")),
        };

        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => hasher_from(config.hashing)?,
        };

        let tokens = TokenService::new(config.token.clone(), credentials, hasher.clone())?;
        let engine = self.engine;
        let authorizer = self
            .authorizer
            .unwrap_or_else(|| Arc::new(engine.unwrap_or_default()));

        let gateway = ResourceGateway::new(
            tokens.clone(),
            authorizer,
            store,
            hasher,
            config.gateway.clone(),
        );

        Ok(AppState {
            config: Arc::new(config),
            tokens,
            gateway,
        })
    }
}

fn hasher_from(config: HashConfig) -> ApiResult<CredentialHasher> {
    CredentialHasher::new(config).map_err(|e| ApiError::internal(e.to_string()))
}
