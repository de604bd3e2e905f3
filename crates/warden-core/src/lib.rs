// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Domain model and storage layer for the Warden access gateway.
//!
//! - **Types**: `User`, `Product`, `Role`, `ResourceType`, `Operation` and their IDs
//! - **Store**: `CredentialStore` and `ResourceStore` contracts
//! - **Memory**: lock-guarded in-memory implementation of both stores
//! - **Password**: Argon2id hashing and verification
//! - **Seed**: idempotent demo data
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_core::{CredentialHasher, HashConfig, MemoryStore, SeedConfig, seed_demo};
//!
//! let store = MemoryStore::new();
//! let hasher = CredentialHasher::new(HashConfig::default())?;
//! seed_demo(&store, &hasher, &SeedConfig::default()).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod memory;
pub mod password;
pub mod seed;
pub mod store;
pub mod types;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{PasswordError, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use password::{CredentialHasher, HashConfig};
pub use seed::{seed_demo, SeedConfig, SeedError, SeedReport};
pub use store::{CredentialStore, ResourceStore};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
