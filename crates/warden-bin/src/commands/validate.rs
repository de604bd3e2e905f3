// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_api::config::ConfigError;
use warden_api::{RoleSource, WardenConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::load_config;

/// Minimum recommended secret length in bytes.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(ConfigError::FileNotFound {
            path: config_path.clone(),
        }
        .into());
    }

    let config = load_config(Some(config_path))?;
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:       {}", config.server.socket_addr());
            println!("  Issuer:       {}", config.token.issuer);
            println!("  Access TTL:   {}s", config.token.access_ttl_secs);
            println!("  Refresh TTL:  {}s", config.token.refresh_ttl_secs);
            println!("  Role source:  {}", config.gateway.role_source.as_str());
            println!(
                "  Seeding:      {}",
                if config.seed.enabled { "enabled" } else { "disabled" }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": summary(&config),
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
        OutputFormat::Yaml => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": summary(&config),
                "warnings": warnings,
            });
            print!(
                "{}",
                serde_yaml::to_string(&output).map_err(BinError::output)?
            );
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Rejected(format!(
            "strict mode, {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn summary(config: &WardenConfig) -> serde_json::Value {
    serde_json::json!({
        "listen": config.server.socket_addr().to_string(),
        "issuer": config.token.issuer,
        "access_ttl_secs": config.token.access_ttl_secs,
        "refresh_ttl_secs": config.token.refresh_ttl_secs,
        "role_source": config.gateway.role_source.as_str(),
        "seed_enabled": config.seed.enabled,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value).map_err(BinError::output)
}

/// Collects non-fatal findings about a valid configuration.
pub fn collect_warnings(config: &WardenConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.token.secret.len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "Token secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }
    if config.token.refresh_ttl_secs <= config.token.access_ttl_secs {
        warnings.push("Refresh TTL does not exceed access TTL".to_string());
    }
    if config.seed.enabled && config.seed.admin_password == "owner1234" {
        warnings.push("Seeded admin uses the default password".to_string());
    }
    if config.gateway.role_source == RoleSource::Token && config.token.access_ttl_secs > 86_400 {
        warnings.push(
            "Role changes take effect only on reissue; access TTL exceeds one day".to_string(),
        );
    }
    if config.server.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_api::TokenConfig;

    #[test]
    fn test_collect_warnings() {
        let config = WardenConfig {
            token: TokenConfig::new("short-secret-but-nonempty"),
            ..Default::default()
        };
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("shorter than")));
        assert!(warnings.iter().any(|w| w.contains("default password")));

        let mut config = WardenConfig {
            token: TokenConfig::new("a-secret-that-is-comfortably-over-thirty-two-bytes"),
            ..Default::default()
        };
        config.seed.enabled = false;
        config.server.cors.allowed_origins = vec!["https://shop.example".to_string()];
        assert!(collect_warnings(&config).is_empty());
    }
}
