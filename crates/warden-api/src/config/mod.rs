// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service configuration.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! token:
//!   secret: ${WARDEN_SECRET}
//!   access_ttl_secs: 3600
//! gateway:
//!   role_source: token
//! seed:
//!   enabled: true
//! ```

mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_core::{HashConfig, SeedConfig};

use crate::auth::TokenConfig;
use crate::gateway::GatewayConfig;

// =============================================================================
// WardenConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Token signing settings.
    pub token: TokenConfig,
    /// Gateway settings.
    pub gateway: GatewayConfig,
    /// Password hashing cost.
    pub hashing: HashConfig,
    /// Demo data seeding.
    pub seed: SeedConfig,
}

impl WardenConfig {
    /// Validates every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.token.validate()?;

        if self.hashing.memory_kib < 8 * self.hashing.parallelism {
            return Err(ConfigError::validation(
                "hashing.memory_kib",
                "must be at least 8 KiB per lane",
            ));
        }
        if self.hashing.iterations == 0 {
            return Err(ConfigError::validation(
                "hashing.iterations",
                "must be at least 1",
            ));
        }
        if self.hashing.parallelism == 0 {
            return Err(ConfigError::validation(
                "hashing.parallelism",
                "must be at least 1",
            ));
        }

        if self.seed.enabled {
            if self.seed.admin_username.trim().is_empty() {
                return Err(ConfigError::validation(
                    "seed.admin_username",
                    "must not be empty",
                ));
            }
            if self.seed.admin_password.is_empty() {
                return Err(ConfigError::validation(
                    "seed.admin_password",
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// ServerConfig
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Request timeout.
    #[serde(with = "secs_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "secs_serde")]
    pub shutdown_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "must be greater than zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers.
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: 3600,
        }
    }
}

// =============================================================================
// Duration as seconds
// =============================================================================

mod secs_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================
