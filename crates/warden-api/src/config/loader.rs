// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse into [`WardenConfig`]
//! 4. Apply environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! WARDEN_SECRET=...
//! WARDEN_HOST=127.0.0.1
//! WARDEN_PORT=9090
//! WARDEN_TOKEN_TTL_SECS=900
//! WARDEN_ROLE_SOURCE=store
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::WardenConfig;
use crate::gateway::RoleSource;

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads [`WardenConfig`] from files and the environment.
///
/// # Examples
///
/// ```no_run
/// use warden_api::config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("warden.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,
    /// Whether to read the environment at all.
    resolve_env_vars: bool,
    /// Explicit variables consulted before the process environment.
    overrides: HashMap<String, String>,
}

impl ConfigLoader {
    /// Creates a loader with the `WARDEN` prefix.
    pub fn new() -> Self {
        Self {
            env_prefix: "WARDEN".to_string(),
            resolve_env_vars: true,
            overrides: HashMap::new(),
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Sets a variable that shadows the process environment.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is determined by the extension: `.yaml`/`.yml`, `.toml` or
    /// `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = ConfigFormat::from_path(path)?;

        let config = self.load_text(&content, format, &path.display().to_string())?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        self.load_text(content, format, "<inline>")
    }

    fn load_text(
        &self,
        content: &str,
        format: ConfigFormat,
        origin: &str,
    ) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = format
            .parse(&content)
            .map_err(|message| ConfigError::syntax(origin, format.name(), message))?;
        self.finish(&mut config)?;
        Ok(config)
    }

    /// Builds configuration from defaults plus environment overrides.
    pub fn load_defaults(&self) -> ConfigResult<WardenConfig> {
        let mut config = WardenConfig::default();
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish(&self, config: &mut WardenConfig) -> ConfigResult<()> {
        if self.resolve_env_vars {
            self.apply_env_overrides(config)?;
        }
        config.validate()?;
        debug!(
            addr = %config.server.socket_addr(),
            role_source = config.gateway.role_source.as_str(),
            seed = config.seed.enabled,
            "Configuration validated"
        );
        Ok(())
    }

    fn var(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    fn prefixed(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next(); // consume '{'

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (name, default) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (self.var(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!(var = name, "Environment variable not found");
                    result.push_str(&format!("${{{}}}", name));
                }
            }
        }

        result
    }

    fn apply_env_overrides(&self, config: &mut WardenConfig) -> ConfigResult<()> {
        let name = self.prefixed("SECRET");
        if let Some(value) = self.var(&name) {
            debug!(var = %name, "Overriding token secret");
            config.token.secret = value;
        }

        let name = self.prefixed("HOST");
        if let Some(value) = self.var(&name) {
            config.server.host = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(&name, "expected an IP address"))?;
        }

        let name = self.prefixed("PORT");
        if let Some(value) = self.var(&name) {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(&name, "expected valid port number"))?;
        }

        let name = self.prefixed("TOKEN_TTL_SECS");
        if let Some(value) = self.var(&name) {
            config.token.access_ttl_secs = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(&name, "expected a number of seconds"))?;
        }

        let name = self.prefixed("ROLE_SOURCE");
        if let Some(value) = self.var(&name) {
            config.gateway.role_source = RoleSource::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(&name, "expected 'token' or 'store'"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::UnsupportedFormat {
                extension: other.to_string(),
            }),
            None => Err(ConfigError::UnsupportedFormat {
                extension: String::new(),
            }),
        }
    }

    /// Returns the format name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Parses a document, returning the parser's message on failure.
    fn parse(&self, content: &str) -> Result<WardenConfig, String> {
        match self {
            ConfigFormat::Yaml => ::config::Config::builder()
                .add_source(::config::File::from_str(content, ::config::FileFormat::Yaml))
                .build()
                .and_then(|c| c.try_deserialize())
                .map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    
    const SECRET: &str = "loader-test-secret-that-is-long-enough";

    fn loader() -> ConfigLoader {
        // Isolated from whatever WARDEN_* the test process inherits.
        ConfigLoader::new().with_env_prefix("WARDEN_LOADER_TEST")
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\ntoken:\n  secret: {}\n  access_ttl_secs: 600\ngateway:\n  role_source: store\n",
            SECRET
        )
        .unwrap();

        let config = loader().load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.token.access_ttl_secs, 600);
        assert_eq!(config.token.refresh_ttl_secs, 86400 * 7);
        assert_eq!(config.gateway.role_source, RoleSource::Store);
    }

    #[test]
    fn test_load_toml_and_json() {
        let toml = format!("[token]\nsecret = \"{}\"\n\n[seed]\nenabled = false\n", SECRET);
        let config = loader().load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert!(!config.seed.enabled);

        let json = format!(r#"{{"token": {{"secret": "{}"}}, "seed": {{"demo_products": 2}}}}"#, SECRET);
        let config = loader().load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.seed.demo_products, 2);
    }

    #[test]
    fn test_placeholder_with_default() {
        let content = "token:\n  secret: ${WARDEN_LOADER_TEST_UNSET:fallback-secret-that-is-long-enough}\n";
        let config = loader().load_from_str(content, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.token.secret, "fallback-secret-that-is-long-enough");
    }

    #[test]
    fn test_placeholder_from_var() {
        let loader = loader().with_var("MY_SECRET", SECRET);
        let resolved = loader.resolve_env_placeholders("secret: ${MY_SECRET} ${UNCLOSED");
        assert_eq!(resolved, format!("secret: {} ${{UNCLOSED", SECRET));
    }

    #[test]
    fn test_env_overrides() {
        let config = loader()
            .with_var("WARDEN_LOADER_TEST_SECRET", SECRET)
            .with_var("WARDEN_LOADER_TEST_PORT", "7000")
            .with_var("WARDEN_LOADER_TEST_HOST", "127.0.0.1")
            .with_var("WARDEN_LOADER_TEST_TOKEN_TTL_SECS", "120")
            .with_var("WARDEN_LOADER_TEST_ROLE_SOURCE", "store")
            .load_defaults()
            .unwrap();

        assert_eq!(config.token.secret, SECRET);
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.token.access_ttl_secs, 120);
        assert_eq!(config.gateway.role_source, RoleSource::Store);
    }

    #[test]
    fn test_invalid_env_override() {
        let err = loader()
            .with_var("WARDEN_LOADER_TEST_SECRET", SECRET)
            .with_var("WARDEN_LOADER_TEST_PORT", "not-a-port")
            .load_defaults()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = loader().load_defaults().unwrap_err();
        assert_eq!(err.field(), Some("token.secret"));
    }

    #[test]
    fn test_syntax_error_names_origin() {
        let err = loader()
            .load_from_str("token: [unclosed", ConfigFormat::Yaml)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { format: "YAML", .. }));
        assert!(err.to_string().contains("<inline>"));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")).unwrap(), ConfigFormat::Toml);
        assert!(ConfigFormat::from_path(Path::new("config.txt")).is_err());
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_file_not_found() {
        let err = loader().load("/nonexistent/warden.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
