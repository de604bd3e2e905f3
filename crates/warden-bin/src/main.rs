// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Warden - role-based access control for users and products.
//!
//! Main binary entry point.

use warden_bin::error::report_error_and_exit;
use warden_bin::{commands, init_logging, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = init_logging(cli.effective_log_level(), cli.log_format) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
