// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Resource gateway.
//!
//! Every call runs the same pipeline:
//!
//! 1. verify the bearer token (any failure is `Unauthenticated`)
//! 2. ask the [`Authorizer`] (deny is `Forbidden`)
//! 3. validate the payload (`ValidationError` with per-field messages)
//! 4. execute against the [`ResourceStore`]
//!
//! Later steps never run when an earlier one fails. Mutations are recorded on
//! the `warden::audit` tracing target.

mod payload;

pub use payload::{
    check_password_rules, decode_body, parse_command, Command, UserChanges, UserDraft,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use warden_core::{
    CredentialHasher, CredentialStore, NewUser, Operation, PasswordError, ResourceStore, ResourceType, Role,
    StoreError, UserPatch, UserView,
};

use crate::auth::{AuthContext, Authorizer, PermissionSet, TokenService};
use crate::error::ValidationErrors;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = "warden::audit";

// =============================================================================
// Configuration
// =============================================================================

/// Where the gateway takes the caller's role from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// Trust the role claim for the token's lifetime.
    #[default]
    Token,
    /// Re-read the role from the store on every call.
    Store,
}

impl RoleSource {
    /// Parses a role source name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "token" | "claim" => Some(RoleSource::Token),
            "store" | "live" => Some(RoleSource::Store),
            _ => None,
        }
    }

    /// Returns the name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleSource::Token => "token",
            RoleSource::Store => "store",
        }
    }
}

/// Gateway settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Role source.
    pub role_source: RoleSource,
}

// =============================================================================
// Errors and outcomes
// =============================================================================

/// Gateway failures, in pipeline order.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The token was missing, malformed, expired or badly signed, or its
    /// subject no longer exists.
    #[error("Authentication required")]
    Unauthenticated,

    /// The permission table denies the operation.
    #[error("Role '{role}' may not {operation} {resource}")]
    Forbidden {
        /// Effective role.
        role: Role,
        /// Resource type.
        resource: ResourceType,
        /// Operation.
        operation: Operation,
    },

    /// The addressed entity does not exist.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Resource type.
        resource: ResourceType,
        /// Requested ID.
        id: String,
    },

    /// The payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store or hashing failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the error kind as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Unauthenticated => "unauthenticated",
            GatewayError::Forbidden { .. } => "forbidden",
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::Validation(_) => "validation",
            GatewayError::Conflict(_) => "conflict",
            GatewayError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, id } => GatewayError::NotFound { resource, id },
            StoreError::Conflict { .. } => GatewayError::Conflict(err.to_string()),
            StoreError::Backend { message } => GatewayError::Internal(message),
        }
    }
}

impl From<PasswordError> for GatewayError {
    fn from(err: PasswordError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for GatewayError {
    fn from(errors: ValidationErrors) -> Self {
        GatewayError::Validation(errors)
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Successful gateway result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// An entity was created.
    Created(Value),
    /// A single entity was read.
    Found(Value),
    /// Entities were listed.
    Listed(Vec<Value>),
    /// An entity was updated.
    Updated(Value),
    /// An entity was deleted.
    Deleted,
}

impl Outcome {
    /// Returns the JSON body of the outcome, if any.
    pub fn body(&self) -> Option<Value> {
        match self {
            Outcome::Created(v) | Outcome::Found(v) | Outcome::Updated(v) => Some(v.clone()),
            Outcome::Listed(items) => Some(Value::Array(items.clone())),
            Outcome::Deleted => None,
        }
    }
}

// =============================================================================
// ResourceGateway
// =============================================================================

/// Authenticated, authorized access to the resource store.
#[derive(Clone)]
pub struct ResourceGateway {
    tokens: TokenService,
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn ResourceStore>,
    hasher: CredentialHasher,
    config: GatewayConfig,
}

impl ResourceGateway {
    /// Creates a gateway.
    pub fn new(
        tokens: TokenService,
        authorizer: Arc<dyn Authorizer>,
        store: Arc<dyn ResourceStore>,
        hasher: CredentialHasher,
        config: GatewayConfig,
    ) -> Self {
        Self {
            tokens,
            authorizer,
            store,
            hasher,
            config,
        }
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verifies a token and resolves the caller's effective role.
    pub async fn authenticate(&self, token: &str) -> GatewayResult<AuthContext> {
        let claims = self.tokens.verify(token).map_err(|e| {
            debug!(kind = e.error_type(), "Token rejected");
            GatewayError::Unauthenticated
        })?;
        let context = AuthContext::from_claims(&claims);

        match self.config.role_source {
            RoleSource::Token => Ok(context),
            RoleSource::Store => {
                let user = self.store.find_user(&claims.sub).await?.ok_or_else(|| {
                    debug!(user_id = %claims.sub, "Token subject no longer exists");
                    GatewayError::Unauthenticated
                })?;
                if user.role != claims.role {
                    debug!(
                        user_id = %user.id,
                        claimed = %claims.role,
                        current = %user.role,
                        "Role changed since issuance"
                    );
                }
                Ok(context.with_role(user.role))
            }
        }
    }

    /// Returns the permissions the authorizer grants a role.
    pub fn permissions_for(&self, role: Role) -> PermissionSet {
        self.authorizer.permissions_for(role)
    }

    /// Runs one operation through the full pipeline.
    pub async fn handle(
        &self,
        token: &str,
        resource: ResourceType,
        operation: Operation,
        payload: &Value,
    ) -> GatewayResult<Outcome> {
        let context = self.authorize(token, resource, operation).await?;
        self.run(&context, resource, operation, payload).await
    }

    /// Runs one operation whose payload is an undecoded request body.
    ///
    /// The body is decoded only once the caller is authenticated and
    /// authorized. `path_id` replaces any `id` in a JSON object body.
    pub async fn handle_body(
        &self,
        token: &str,
        resource: ResourceType,
        operation: Operation,
        path_id: Option<&str>,
        body: &[u8],
    ) -> GatewayResult<Outcome> {
        let context = self.authorize(token, resource, operation).await?;

        let mut payload = decode_body(body)?;
        if let (Some(id), Value::Object(map)) = (path_id, &mut payload) {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        self.run(&context, resource, operation, &payload).await
    }

    async fn authorize(
        &self,
        token: &str,
        resource: ResourceType,
        operation: Operation,
    ) -> GatewayResult<AuthContext> {
        let context = self.authenticate(token).await?;

        if !self
            .authorizer
            .decide(context.role, resource, operation)
            .is_allowed()
        {
            warn!(
                target: AUDIT_TARGET,
                actor = %context.user_id,
                role = %context.role,
                resource = %resource,
                operation = %operation,
                "Access denied"
            );
            return Err(GatewayError::Forbidden {
                role: context.role,
                resource,
                operation,
            });
        }
        Ok(context)
    }

    async fn run(
        &self,
        context: &AuthContext,
        resource: ResourceType,
        operation: Operation,
        payload: &Value,
    ) -> GatewayResult<Outcome> {
        let command = parse_command(resource, operation, payload)?;
        let target = command.target_id();
        let outcome = self.execute(command).await?;

        if operation.is_mutating() {
            let id = target
                .or_else(|| {
                    outcome
                        .body()
                        .and_then(|b| b.get("id").and_then(Value::as_str).map(str::to_string))
                })
                .unwrap_or_default();
            info!(
                target: AUDIT_TARGET,
                actor = %context.user_id,
                actor_name = %context.username,
                resource = %resource,
                operation = %operation,
                id = %id,
                request_id = %context.request_id,
                "Resource mutated"
            );
        }

        Ok(outcome)
    }

    /// Returns the caller's own account.
    pub async fn current_user(&self, token: &str) -> GatewayResult<UserView> {
        let context = self.authenticate(token).await?;
        let user = self
            .store
            .find_user(&context.user_id)
            .await?
            .ok_or(GatewayError::Unauthenticated)?;
        Ok(user.view())
    }

    /// Changes the caller's own password.
    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> GatewayResult<()> {
        let context = self.authenticate(token).await?;
        self.change_password_for(&context, current_password, new_password)
            .await
    }

    /// Changes the password of an already authenticated caller.
    pub async fn change_password_for(
        &self,
        context: &AuthContext,
        current_password: &str,
        new_password: &str,
    ) -> GatewayResult<()> {
        let user = self
            .store
            .find_user(&context.user_id)
            .await?
            .ok_or(GatewayError::Unauthenticated)?;

        if !self
            .verify_password(current_password, &user.password_hash)
            .await?
        {
            return Err(ValidationErrors::single(
                "current_password",
                "current password is incorrect",
            )
            .into());
        }

        let mut errors = ValidationErrors::new();
        check_password_rules("new_password", new_password, &mut errors);
        if new_password == current_password {
            errors.add("new_password", "must differ from the current password");
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let password_hash = self.hash_password(new_password).await?;
        self.store
            .update_user(
                &user.id,
                UserPatch {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            target: AUDIT_TARGET,
            actor = %context.user_id,
            actor_name = %context.username,
            resource = %ResourceType::User,
            operation = %Operation::Update,
            id = %user.id,
            "Password changed"
        );
        Ok(())
    }

    // =========================================================================
    // Execution
    // =========================================================================

    async fn execute(&self, command: Command) -> GatewayResult<Outcome> {
        match command {
            Command::ListUsers => {
                let users = self.store.list_users().await?;
                Ok(Outcome::Listed(
                    users
                        .iter()
                        .map(|u| to_json(&u.view()))
                        .collect::<GatewayResult<_>>()?,
                ))
            }
            Command::ReadUser(id) => {
                let user = self
                    .store
                    .find_user(&id)
                    .await?
                    .ok_or_else(|| StoreError::not_found(ResourceType::User, id))?;
                Ok(Outcome::Found(to_json(&user.view())?))
            }
            Command::CreateUser(draft) => {
                let password_hash = self.hash_password(&draft.password).await?;
                let user = self
                    .store
                    .create_user(NewUser {
                        username: draft.username,
                        password_hash,
                        role: draft.role,
                        email: draft.email,
                    })
                    .await?;
                Ok(Outcome::Created(to_json(&user.view())?))
            }
            Command::UpdateUser(id, changes) => {
                let password_hash = match &changes.password {
                    Some(password) => Some(self.hash_password(password).await?),
                    None => None,
                };
                let user = self
                    .store
                    .update_user(
                        &id,
                        UserPatch {
                            username: changes.username,
                            password_hash,
                            role: changes.role,
                            email: changes.email,
                        },
                    )
                    .await?;
                Ok(Outcome::Updated(to_json(&user.view())?))
            }
            Command::DeleteUser(id) => {
                self.store.delete_user(&id).await?;
                Ok(Outcome::Deleted)
            }
            Command::ListProducts => {
                let products = self.store.list_products().await?;
                Ok(Outcome::Listed(
                    products.iter().map(to_json).collect::<GatewayResult<_>>()?,
                ))
            }
            Command::ReadProduct(id) => {
                let product = self.store.get_product(&id).await?;
                Ok(Outcome::Found(to_json(&product)?))
            }
            Command::CreateProduct(new) => {
                let product = self.store.create_product(new).await?;
                Ok(Outcome::Created(to_json(&product)?))
            }
            Command::UpdateProduct(id, patch) => {
                let product = self.store.update_product(&id, patch).await?;
                Ok(Outcome::Updated(to_json(&product)?))
            }
            Command::DeleteProduct(id) => {
                self.store.delete_product(&id).await?;
                Ok(Outcome::Deleted)
            }
        }
    }

    // =========================================================================
    // Hashing helpers
    // =========================================================================

    async fn hash_password(&self, password: &str) -> GatewayResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| GatewayError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(GatewayError::from)
    }

    async fn verify_password(&self, password: &str, phc: &str) -> GatewayResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let phc = phc.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &phc))
            .await
            .map_err(|e| GatewayError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(GatewayError::from)
    }
}

impl std::fmt::Debug for ResourceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGateway")
            .field("tokens", &self.tokens)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize>(value: &T) -> GatewayResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| GatewayError::Internal(format!("Failed to serialize entity: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PermissionEngine, TokenConfig};
    use serde_json::json;
    use warden_core::{HashConfig, MemoryStore, SeedConfig};

    const SECRET: &str = "gateway-test-secret-key-of-sufficient-length";

    async fn setup(role_source: RoleSource) -> (ResourceGateway, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let hasher = CredentialHasher::new(HashConfig::fast()).unwrap();
        warden_core::seed_demo(store.as_ref(), &hasher, &SeedConfig::default())
            .await
            .unwrap();

        let tokens = TokenService::new(TokenConfig::new(SECRET), store.clone(), hasher.clone())
            .unwrap();
        let gateway = ResourceGateway::new(
            tokens,
            Arc::new(PermissionEngine::standard()),
            store.clone(),
            hasher,
            GatewayConfig { role_source },
        );
        (gateway, store)
    }

    async fn owner_token(gateway: &ResourceGateway) -> String {
        gateway
            .tokens()
            .issue("owner", "owner1234")
            .await
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_admin_creates_product() {
        let (gateway, store) = setup(RoleSource::Token).await;
        let token = owner_token(&gateway).await;

        let outcome = gateway
            .handle(
                &token,
                ResourceType::Product,
                Operation::Create,
                &json!({"name": "Widget", "price": 9.99}),
            )
            .await
            .unwrap();

        let Outcome::Created(body) = outcome else {
            panic!("expected Created");
        };
        assert_eq!(body["name"], "Widget");
        assert_eq!(store.product_count(), 6);
    }

    #[tokio::test]
    async fn test_unauthenticated_before_validation() {
        let (gateway, _) = setup(RoleSource::Token).await;
        let err = gateway
            .handle("garbage", ResourceType::Product, Operation::Create, &json!(42))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_forbidden_before_validation() {
        let (gateway, _) = setup(RoleSource::Token).await;
        let token = owner_token(&gateway).await;

        // Admin/read is not in the table; the bad payload is never inspected.
        let err = gateway
            .handle(&token, ResourceType::Product, Operation::Read, &json!(null))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_not_found_and_conflict() {
        let (gateway, _) = setup(RoleSource::Token).await;
        let token = owner_token(&gateway).await;

        let err = gateway
            .handle(
                &token,
                ResourceType::Product,
                Operation::Delete,
                &json!({"id": warden_core::ProductId::new().to_string()}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));

        let err = gateway
            .handle(
                &token,
                ResourceType::User,
                Operation::Create,
                &json!({"username": "owner", "password": "another-pass"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_store_role_source_uses_live_role() {
        let (gateway, store) = setup(RoleSource::Store).await;
        let token = owner_token(&gateway).await;

        let owner = store.find_by_username("owner").await.unwrap().unwrap();
        store
            .update_user(
                &owner.id,
                UserPatch {
                    role: Some(Role::User),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = gateway
            .handle(&token, ResourceType::User, Operation::List, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden { role: Role::User, .. }));

        store.delete_user(&owner.id).await.unwrap();
        let err = gateway
            .handle(&token, ResourceType::Product, Operation::List, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (gateway, _) = setup(RoleSource::Token).await;
        let token = owner_token(&gateway).await;

        let err = gateway
            .change_password(&token, "wrong-password", "brand-new-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref e) if e.has_field("current_password")));

        let err = gateway
            .change_password(&token, "owner1234", "owner1234")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref e) if e.has_field("new_password")));

        gateway
            .change_password(&token, "owner1234", "brand-new-pass")
            .await
            .unwrap();
        assert!(gateway.tokens().issue("owner", "owner1234").await.is_err());
        assert!(gateway.tokens().issue("owner", "brand-new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn test_current_user() {
        let (gateway, _) = setup(RoleSource::Token).await;
        let token = owner_token(&gateway).await;

        let me = gateway.current_user(&token).await.unwrap();
        assert_eq!(me.username, "owner");
        assert_eq!(me.role, Role::Admin);
    }

    #[test]
    fn test_role_source_parse() {
        assert_eq!(RoleSource::parse("STORE"), Some(RoleSource::Store));
        assert_eq!(RoleSource::parse("token"), Some(RoleSource::Token));
        assert_eq!(RoleSource::parse("db"), None);
        assert_eq!(RoleSource::default(), RoleSource::Token);
    }
}
