// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so verification reads its parameters from the stored hash and keeps working
//! after [`HashConfig`] changes.

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};

use crate::error::PasswordError;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

// =============================================================================
// HashConfig
// =============================================================================

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashConfig {
    /// Minimal parameters for tests and local tooling. Not for production.
    pub fn fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))
    }
}

// =============================================================================
// CredentialHasher
// =============================================================================

/// Hashes and verifies passwords with Argon2id.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    config: HashConfig,
    params: Params,
}

impl CredentialHasher {
    /// Creates a hasher, rejecting parameters Argon2 does not accept.
    pub fn new(config: HashConfig) -> Result<Self, PasswordError> {
        let params = config.params()?;
        Ok(Self { config, params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Returns the configured parameters.
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// cannot be parsed.
    pub fn verify(&self, password: &str, phc: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(phc).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Produces a hash of a random throwaway password.
    ///
    /// Verifying against it costs the same as a real verification, which
    /// keeps unknown-user logins indistinguishable by timing.
    pub fn dummy_hash(&self) -> Result<String, PasswordError> {
        let mut bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let throwaway: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        self.hash(&throwaway)
    }
}

// =============================================================================
// Tests
// =============================================================================
