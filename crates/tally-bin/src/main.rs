// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tally - access-control service for inventory and asset tracking.
//!
//! Main binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use tally_api::{ApiConfig, ApiServer, AppState};
use tally_bin::cli::{Cli, Commands, ServeArgs};
use tally_bin::error::BinResult;
use tally_bin::logging::init_logging;
use tally_bin::shutdown::shutdown_signal;
use tally_store::{AccessStore, MemoryStore, NewUser};

#[tokio::main]
async fn main() -> BinResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.command() {
        Commands::Serve(args) => serve(args).await,
        Commands::Version => {
            println!("tally v{}", tally_core::VERSION);
            println!("Session, user, and permission service");
            Ok(())
        }
    }
}

/// Bootstraps the store, seeds the administrator account, and runs the
/// API server until a shutdown signal arrives.
async fn serve(args: ServeArgs) -> BinResult<()> {
    let mut config = ApiConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let store = Arc::new(MemoryStore::with_defaults());
    seed_admin(store.as_ref(), &args).await?;

    let state = AppState::new(config, store);
    let server = ApiServer::new(state);

    info!(version = tally_core::VERSION, "Starting tally");

    server.run_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Creates the administrator account in the most-privileged seeded group.
///
/// The password comes from the CLI (or `TALLY_ADMIN_PASSWORD`); when unset
/// a random one is generated and logged once at startup.
async fn seed_admin(store: &MemoryStore, args: &ServeArgs) -> BinResult<()> {
    let group = store
        .groups()
        .await?
        .into_iter()
        .min_by_key(|g| g.priority);

    let (password, generated) = match &args.admin_password {
        Some(password) => (password.clone(), false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    };

    let admin = store
        .create_user(NewUser {
            username: args.admin_username.clone(),
            password: password.clone(),
            group_id: group.map(|g| g.id),
            group_expiration: None,
            permission_ids: Vec::new(),
        })
        .await?;

    if generated {
        info!(
            username = %args.admin_username,
            password = %password,
            "Seeded administrator account with a generated password"
        );
    } else {
        info!(username = %args.admin_username, "Seeded administrator account");
    }

    tracing::debug!(user_id = admin.id, "Administrator user id");

    Ok(())
}
