// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store.
//!
//! Each map sits behind its own `parking_lot::RwLock`. Every operation takes
//! the lock once, so the username uniqueness check and the insert happen under
//! the same write guard.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::store::{CredentialStore, ResourceStore};
use crate::types::{
    NewProduct, NewUser, Product, ProductId, ProductPatch, ResourceType, User, UserId, UserPatch,
};

/// Thread-safe in-memory implementation of both store traits.
///
/// Keys are time-ordered UUIDs, so iteration order is creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<UserId, User>>,
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Returns the number of stored products.
    pub fn product_count(&self) -> usize {
        self.products.read().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().values().cloned().collect())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::conflict(
                ResourceType::User,
                "username",
                user.username,
            ));
        }

        let created = User {
            id: UserId::new(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            email: user.email,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        trace!(user_id = %created.id, "User inserted");
        Ok(created)
    }

    async fn update_user(&self, id: &UserId, patch: UserPatch) -> StoreResult<User> {
        let mut users = self.users.write();

        if let Some(username) = &patch.username {
            if users
                .values()
                .any(|u| &u.username == username && u.id != *id)
            {
                return Err(StoreError::conflict(
                    ResourceType::User,
                    "username",
                    username.clone(),
                ));
            }
        }

        let user = users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(ResourceType::User, id))?;

        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(email) = patch.email {
            user.email = Some(email);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &UserId) -> StoreResult<()> {
        self.users
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(ResourceType::User, id))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().values().cloned().collect())
    }

    async fn get_product(&self, id: &ProductId) -> StoreResult<Product> {
        self.products
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceType::Product, id))
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(),
            name: product.name,
            price: product.price,
            category: product.category,
            owner_org: product.owner_org,
            quantity: product.quantity,
            description: product.description,
            created_at: now,
            updated_at: now,
        };
        self.products.write().insert(created.id, created.clone());
        trace!(product_id = %created.id, "Product inserted");
        Ok(created)
    }

    async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> StoreResult<Product> {
        let mut products = self.products.write();
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(ResourceType::Product, id))?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(owner_org) = patch.owner_org {
            product.owner_org = owner_org;
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> StoreResult<()> {
        self.products
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(ResourceType::Product, id))
    }
}

// =============================================================================
// Tests
// =============================================================================
