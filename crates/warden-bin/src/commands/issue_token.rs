// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-token` command.

use crate::cli::{Cli, IssueTokenArgs, OutputFormat};
use crate::error::{BinError, BinResult};
use crate::runtime::RuntimeBuilder;

/// Issues a token pair against a freshly seeded store.
///
/// Tokens verify against any service sharing the signing secret. Subjects
/// are only stable across processes when the gateway trusts the token role.
pub async fn issue_token(cli: &Cli, args: IssueTokenArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .seed(true)
        .build()?;

    let seed = &runtime.config().seed;
    let username = args.username.unwrap_or_else(|| seed.admin_username.clone());
    let password = args.password.unwrap_or_else(|| seed.admin_password.clone());

    let state = runtime.build_state().await?;
    let issued = state
        .tokens()
        .issue(&username, &password)
        .await
        .map_err(|e| BinError::from(e).with_context(format!("issuing token for {}", username)))?;

    let expires_at = issued
        .claims
        .expires_at()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    match args.format {
        OutputFormat::Text => {
            println!("access_token:  {}", issued.access_token);
            if let Some(refresh) = &issued.refresh_token {
                println!("refresh_token: {}", refresh);
            }
            println!("role:          {}", issued.claims.role);
            println!("expires_at:    {}", expires_at);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "access_token": issued.access_token,
                "refresh_token": issued.refresh_token,
                "token_type": "Bearer",
                "expires_in": issued.expires_in,
                "expires_at": expires_at,
                "role": issued.claims.role,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(BinError::output)?
            );
        }
        OutputFormat::Yaml => {
            let output = serde_json::json!({
                "access_token": issued.access_token,
                "refresh_token": issued.refresh_token,
                "expires_at": expires_at,
                "role": issued.claims.role,
            });
            print!(
                "{}",
                serde_yaml::to_string(&output).map_err(BinError::output)?
            );
        }
    }
    Ok(())
}
