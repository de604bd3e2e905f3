// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Instrumented doubles for the gateway's seams:
//!
//! - [`CountingAuthorizer`]: wraps a permission engine and counts decisions
//! - [`RecordingStore`]: wraps a memory store and records every call
//! - [`FailingStore`]: fails every call with a backend error

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_api::{Authorizer, Decision, PermissionEngine};
use warden_core::{
    CredentialStore, MemoryStore, NewProduct, NewUser, Operation, Product, ProductId,
    ProductPatch, ResourceStore, ResourceType, Role, StoreError, StoreResult, User, UserId,
    UserPatch,
};

// =============================================================================
// CountingAuthorizer
// =============================================================================

/// Authorizer that counts how often it is consulted.
#[derive(Debug, Default)]
pub struct CountingAuthorizer {
    inner: PermissionEngine,
    calls: AtomicUsize,
}

impl CountingAuthorizer {
    /// Wraps the given engine.
    pub fn new(inner: PermissionEngine) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of decisions made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Authorizer for CountingAuthorizer {
    fn decide(&self, role: Role, resource: ResourceType, operation: Operation) -> Decision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decide(role, resource, operation)
    }
}

// =============================================================================
// RecordingStore
// =============================================================================

/// Store that records the name of every method called on it.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingStore {
    /// Creates an empty recording store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded calls in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// Returns the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forgets recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }
}

#[async_trait]
impl CredentialStore for RecordingStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.record("find_by_username");
        self.inner.find_by_username(username).await
    }

    async fn find_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.record("find_user");
        self.inner.find_user(id).await
    }
}

#[async_trait]
impl ResourceStore for RecordingStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.record("list_users");
        self.inner.list_users().await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.record("create_user");
        self.inner.create_user(user).await
    }

    async fn update_user(&self, id: &UserId, patch: UserPatch) -> StoreResult<User> {
        self.record("update_user");
        self.inner.update_user(id, patch).await
    }

    async fn delete_user(&self, id: &UserId) -> StoreResult<()> {
        self.record("delete_user");
        self.inner.delete_user(id).await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.record("list_products");
        self.inner.list_products().await
    }

    async fn get_product(&self, id: &ProductId) -> StoreResult<Product> {
        self.record("get_product");
        self.inner.get_product(id).await
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        self.record("create_product");
        self.inner.create_product(product).await
    }

    async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> StoreResult<Product> {
        self.record("update_product");
        self.inner.update_product(id, patch).await
    }

    async fn delete_product(&self, id: &ProductId) -> StoreResult<()> {
        self.record("delete_product");
        self.inner.delete_product(id).await
    }
}

// =============================================================================
// FailingStore
// =============================================================================

/// Store whose CRUD calls fail with a backend error.
///
/// Credential lookups are delegated so tokens can still be issued against
/// the wrapped store.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
}

impl FailingStore {
    /// Wraps a store whose credentials stay readable.
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner }
    }

    fn fail<T>() -> StoreResult<T> {
        Err(StoreError::backend("simulated outage"))
    }
}

#[async_trait]
impl CredentialStore for FailingStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.inner.find_by_username(username).await
    }

    async fn find_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.inner.find_user(id).await
    }
}

#[async_trait]
impl ResourceStore for FailingStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Self::fail()
    }

    async fn create_user(&self, _user: NewUser) -> StoreResult<User> {
        Self::fail()
    }

    async fn update_user(&self, _id: &UserId, _patch: UserPatch) -> StoreResult<User> {
        Self::fail()
    }

    async fn delete_user(&self, _id: &UserId) -> StoreResult<()> {
        Self::fail()
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Self::fail()
    }

    async fn get_product(&self, _id: &ProductId) -> StoreResult<Product> {
        Self::fail()
    }

    async fn create_product(&self, _product: NewProduct) -> StoreResult<Product> {
        Self::fail()
    }

    async fn update_product(&self, _id: &ProductId, _patch: ProductPatch) -> StoreResult<Product> {
        Self::fail()
    }

    async fn delete_product(&self, _id: &ProductId) -> StoreResult<()> {
        Self::fail()
    }
}
