// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod hash_password;
mod issue_token;
mod serve;
mod validate;
mod version;

pub use hash_password::hash_password;
pub use issue_token::issue_token;
pub use serve::serve;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Serve(args) => serve::serve(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::HashPassword(args) => hash_password::hash_password(&cli, args),
        Commands::IssueToken(args) => issue_token::issue_token(&cli, args).await,
        Commands::Version => version::version(&cli),
    }
}
