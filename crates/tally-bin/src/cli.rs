// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Start the API server (default)
//! - `version`: Show version information

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Tally - access-control service for inventory and asset tracking.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    author = "Sylvex <contact@sylvex.io>",
    version = tally_core::VERSION,
    about = "Session, user, and permission service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "TALLY_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "TALLY_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run, defaulting to `serve`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve(ServeArgs {
            host: None,
            port: None,
            admin_username: default_admin_username(),
            admin_password: None,
        }))
    }
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Tally CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Show detailed version information
    Version,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Bind address override
    #[arg(long, env = "TALLY_HOST")]
    pub host: Option<IpAddr>,

    /// Port override
    #[arg(short, long, env = "TALLY_PORT")]
    pub port: Option<u16>,

    /// Username of the seeded administrator account
    #[arg(long, default_value = "admin", env = "TALLY_ADMIN_USERNAME")]
    pub admin_username: String,

    /// Password of the seeded administrator account; a random one is
    /// generated and logged when unset
    #[arg(long, env = "TALLY_ADMIN_PASSWORD")]
    pub admin_password: Option<String>,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

// =============================================================================
// Log Format
// =============================================================================

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for log aggregation.
    Json,
    /// Compact single-line output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tally"]);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(matches!(cli.command(), Commands::Serve(_)));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["tally", "serve", "--port", "9000"]);
        match cli.command() {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.admin_username, "admin");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_version_command() {
        let cli = Cli::parse_from(["tally", "version"]);
        assert!(matches!(cli.command(), Commands::Version));
    }
}
