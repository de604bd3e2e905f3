// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store contracts.
//!
//! [`CredentialStore`] is the narrow read-only view the token service needs at
//! issuance time. [`ResourceStore`] carries the CRUD surface the gateway
//! executes against. Both are object safe so services can hold
//! `Arc<dyn ...>` handles.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{NewProduct, NewUser, Product, ProductId, ProductPatch, User, UserId, UserPatch};

/// Read access to user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds a user by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Finds a user by identifier.
    async fn find_user(&self, id: &UserId) -> StoreResult<Option<User>>;
}

/// CRUD access to users and products.
#[async_trait]
pub trait ResourceStore: CredentialStore {
    /// Lists all users ordered by creation.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Creates a user. Fails with `Conflict` if the username is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Applies a patch to a user.
    async fn update_user(&self, id: &UserId, patch: UserPatch) -> StoreResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, id: &UserId) -> StoreResult<()>;

    /// Lists all products ordered by creation.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Gets a product.
    async fn get_product(&self, id: &ProductId) -> StoreResult<Product>;

    /// Creates a product.
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;

    /// Applies a patch to a product.
    async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> StoreResult<Product>;

    /// Deletes a product.
    async fn delete_product(&self, id: &ProductId) -> StoreResult<()>;
}
