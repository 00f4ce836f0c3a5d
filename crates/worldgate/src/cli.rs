//! Command-line interface handling for the worldgate relay server.
//!
//! This module provides command-line argument parsing and CLI interface
//! management using the `clap` crate for robust argument handling.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// This structure holds all the command-line options that can be used to
/// override configuration file settings or provide runtime parameters.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the client-facing bind address
    pub bind_address: Option<String>,
    /// Optional override for the upstream process address
    pub upstream_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    ///
    /// Sets up the command-line interface with all available options and
    /// returns a structured representation of the parsed arguments.
    pub fn parse() -> Self {
        let matches = Command::new("Worldgate Relay Server")
            .version(env!("CARGO_PKG_VERSION"))
            .about("WebSocket relay/gateway tier for a multiplayer world server")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("config.toml"),
            )
            .arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDRESS")
                    .help("Client-facing bind address (e.g., 127.0.0.1:8080)"),
            )
            .arg(
                Arg::new("upstream")
                    .short('u')
                    .long("upstream")
                    .value_name("ADDRESS")
                    .help("Upstream game-logic process address (e.g., 127.0.0.1:9000)"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .get_matches();

        Self {
            config_path: PathBuf::from(
                matches
                    .get_one::<String>("config")
                    .expect("Default config path should always be set"),
            ),
            bind_address: matches.get_one::<String>("bind").cloned(),
            upstream_address: matches.get_one::<String>("upstream").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}
