// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Demo data seeding.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{PasswordError, StoreError};
use crate::password::CredentialHasher;
use crate::store::ResourceStore;
use crate::types::{NewProduct, NewUser, Role};

/// Demo seeding settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Whether to seed at startup.
    pub enabled: bool,
    /// Username of the seeded admin.
    pub admin_username: String,
    /// Password of the seeded admin.
    pub admin_password: String,
    /// Number of demo products to create.
    pub demo_products: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_username: "owner".to_string(),
            admin_password: "owner1234".to_string(),
            demo_products: 5,
        }
    }
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("enabled", &self.enabled)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .field("demo_products", &self.demo_products)
            .finish()
    }
}

/// Errors raised while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Hashing the admin password failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The store rejected an insert.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a seeding run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Whether the admin account was created by this run.
    pub admin_created: bool,
    /// Number of products created by this run.
    pub products_created: u32,
}

/// Seeds the admin account and demo products.
///
/// Idempotent: an existing admin username is left untouched, and products are
/// only created when the catalog is empty.
pub async fn seed_demo(
    store: &dyn ResourceStore,
    hasher: &CredentialHasher,
    config: &SeedConfig,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    if store
        .find_by_username(&config.admin_username)
        .await?
        .is_none()
    {
        let password_hash = hasher.hash(&config.admin_password)?;
        let admin = store
            .create_user(NewUser {
                username: config.admin_username.clone(),
                password_hash,
                role: Role::Admin,
                email: None,
            })
            .await?;
        info!(user_id = %admin.id, username = %admin.username, "Seeded admin account");
        report.admin_created = true;
    } else {
        debug!(username = %config.admin_username, "Admin account already present");
    }

    if store.list_products().await?.is_empty() {
        for i in 1..=config.demo_products {
            let product = NewProduct::new(format!("Demo Product {}", i), 100.0 + i as f64)
                .with_quantity(10 * i);
            store.create_product(product).await?;
            report.products_created += 1;
        }
        if report.products_created > 0 {
            info!(count = report.products_created, "Seeded demo products");
        }
    }

    Ok(report)
}
