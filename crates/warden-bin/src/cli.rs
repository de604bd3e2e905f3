// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Start the HTTP service (default)
//! - `validate`: Validate configuration file
//! - `hash-password`: Produce an Argon2id hash
//! - `issue-token`: Issue a token against the seeded accounts
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Warden - role-based access control for users and products
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_api::VERSION,
    about = "Token-authenticated, role-checked access to users and products",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "warden.yaml",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "WARDEN_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Warden CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP service
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Validate the configuration file
    ///
    /// Loads, expands and validates the configuration without starting
    /// the service.
    Validate(ValidateArgs),

    /// Hash a password with the configured Argon2id parameters
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),

    /// Issue a token pair for a seeded account
    ///
    /// Builds the same seeded in-memory store the service starts with and
    /// authenticates against it.
    #[command(name = "issue-token")]
    IssueToken(IssueTokenArgs),

    /// Show version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Start with an empty store
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the `issue-token` command.
#[derive(Args, Debug, Clone)]
pub struct IssueTokenArgs {
    /// Account username (defaults to the seeded admin)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Account password (defaults to the seeded admin password)
    #[arg(short, long, env = "WARDEN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
    /// YAML format
    Yaml,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["warden"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Serve(_)));
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::parse_from(["warden", "serve", "--port", "9000", "--no-seed"]);
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.no_seed);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["warden", "validate", "--show-config", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_hash_password_requires_input() {
        assert!(Cli::try_parse_from(["warden", "hash-password"]).is_err());
        assert!(Cli::try_parse_from(["warden", "hash-password", "--stdin"]).is_ok());
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["warden", "-c", "/etc/warden/warden.yaml", "version"]);
        assert_eq!(cli.config, PathBuf::from("/etc/warden/warden.yaml"));
        assert!(matches!(cli.command, Some(Commands::Version)));
    }

    #[test]
    fn test_log_flags() {
        let cli = Cli::parse_from(["warden", "-q"]);
        assert_eq!(cli.effective_log_level(), "warn");

        let cli = Cli::parse_from(["warden", "-v"]);
        assert_eq!(cli.effective_log_level(), "debug");

        let cli = Cli::parse_from(["warden", "-l", "trace", "--log-format", "json"]);
        assert_eq!(cli.effective_log_level(), "trace");
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
