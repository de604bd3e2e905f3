// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! - Configuration loading and validation
//! - Store construction and demo seeding
//! - API server startup
//! - Graceful shutdown coordination

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use warden_api::{ApiServer, AppState, ConfigLoader, WardenConfig};
use warden_core::{seed_demo, CredentialHasher, MemoryStore};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// WardenRuntime
// =============================================================================

/// The service runtime.
pub struct WardenRuntime {
    config: WardenConfig,
    shutdown: ShutdownCoordinator,
}

impl WardenRuntime {
    /// Creates a new runtime.
    pub fn new(config: WardenConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the effective configuration.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the application state over a fresh, optionally seeded store.
    pub async fn build_state(&self) -> BinResult<AppState> {
        let store = Arc::new(MemoryStore::new());
        let hasher = CredentialHasher::new(self.config.hashing)?;

        if self.config.seed.enabled {
            let report = seed_demo(store.as_ref(), &hasher, &self.config.seed).await?;
            info!(
                admin_created = report.admin_created,
                products_created = report.products_created,
                "Demo data seeded"
            );
            if report.admin_created && self.config.seed.admin_password == "owner1234" {
                warn!("Seeded admin uses the default password");
            }
        }

        let state = AppState::builder()
            .config(self.config.clone())
            .store(store)
            .hasher(hasher)
            .build()?;
        Ok(state)
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting Warden v{}", crate::VERSION);

        let state = self.build_state().await?;
        let server = ApiServer::new(state);
        let grace = self.config.server.shutdown_timeout;

        let waiter = self.shutdown.clone();
        tokio::spawn(async move { waiter.wait_for_shutdown().await });

        let serve = server.run_with_shutdown(self.shutdown.shutdown_signal());
        let deadline = {
            let signal = self.shutdown.shutdown_signal();
            async move {
                signal.await;
                tokio::time::sleep(grace).await;
            }
        };

        tokio::select! {
            result = serve => result?,
            _ = deadline => {
                warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, dropping open connections");
            }
        }

        info!("Warden shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<WardenConfig>,
    port: Option<u16>,
    seed: Option<bool>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Overrides whether demo data is seeded.
    pub fn seed(mut self, enabled: bool) -> Self {
        self.seed = Some(enabled);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<WardenRuntime> {
        let mut config = match self.config {
            Some(config) => config,
            None => load_config(self.config_path.as_deref())?,
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(seed) = self.seed {
            config.seed.enabled = seed;
        }

        Ok(WardenRuntime::new(config))
    }
}

/// Loads the configuration file, or defaults plus environment when the file
/// does not exist.
pub fn load_config(path: Option<&Path>) -> BinResult<WardenConfig> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) if path.exists() => loader
            .load(path)
            .map_err(|e| BinError::from(e).with_context(format!("loading {}", path.display()))),
        Some(path) => {
            info!(path = %path.display(), "Config file not found, using defaults and environment");
            Ok(loader.load_defaults()?)
        }
        None => Ok(loader.load_defaults()?),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_api::TokenConfig;
    use warden_core::HashConfig;

    fn test_config() -> WardenConfig {
        WardenConfig {
            token: TokenConfig::new("runtime-test-secret-that-is-long-enough"),
            hashing: HashConfig::fast(),
            ..Default::default()
        }
    }

    #[test]
    fn test_runtime_builder_overrides() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .port(Some(9100))
            .seed(false)
            .build()
            .unwrap();

        assert_eq!(runtime.config().server.port, 9100);
        assert!(!runtime.config().seed.enabled);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"token:\n  secret: file-secret-that-is-long-enough-to-pass\nserver:\n  port: 9200\n",
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9200);
    }

    #[tokio::test]
    async fn test_build_state_seeds() {
        let runtime = WardenRuntime::new(test_config());
        let state = runtime.build_state().await.unwrap();

        let issued = state.tokens().issue("owner", "owner1234").await.unwrap();
        assert_eq!(issued.claims.username, "owner");
    }

    #[tokio::test]
    async fn test_build_state_without_seed() {
        let mut config = test_config();
        config.seed.enabled = false;
        let state = WardenRuntime::new(config).build_state().await.unwrap();

        assert!(state.tokens().issue("owner", "owner1234").await.is_err());
    }
}
