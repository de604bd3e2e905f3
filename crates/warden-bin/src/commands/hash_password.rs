// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::Read;

use anyhow::Context;
use warden_core::CredentialHasher;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::load_config;

/// Hashes a password with the configured Argon2id cost and prints the PHC
/// string.
pub fn hash_password(cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match (args.password, args.stdin) {
        (_, true) => read_stdin()?,
        (Some(password), false) => password,
        (None, false) => return Err(BinError::usage("No password given")),
    };
    if password.is_empty() {
        return Err(BinError::usage("Password must not be empty"));
    }

    // Without a readable config, fall back to the default cost.
    let hashing = load_config(Some(&cli.config))
        .map(|config| config.hashing)
        .unwrap_or_default();

    let hasher = CredentialHasher::new(hashing)?;
    println!("{}", hasher.hash(&password)?);
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading password from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
