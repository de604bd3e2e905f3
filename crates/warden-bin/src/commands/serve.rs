// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use crate::cli::{Cli, ServeArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `serve` command to start the service.
pub async fn serve(cli: &Cli, args: ServeArgs) -> BinResult<()> {
    let mut builder = RuntimeBuilder::new()
        .config_path(&cli.config)
        .port(args.port);
    if args.no_seed {
        builder = builder.seed(false);
    }

    builder.build()?.run().await
}
