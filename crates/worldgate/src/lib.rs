//! # Worldgate Relay Server - Main Entry Point
//!
//! WebSocket relay/gateway tier for a multiplayer world server. This entry
//! point handles CLI parsing, configuration loading, and application
//! lifecycle management.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! worldgate
//!
//! # Specify custom configuration
//! worldgate --config production.toml
//!
//! # Override specific settings
//! worldgate --bind 0.0.0.0:8080 --upstream 10.0.0.4:9000 --log-level debug
//!
//! # JSON logging for production
//! worldgate --json-logs
//! ```
//!
//! ## Configuration
//!
//! The relay loads configuration from a TOML file (default: `config.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The relay handles graceful shutdown on:
//! - SIGINT (Ctrl+C)
//! - SIGTERM (Unix systems)

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for the worldgate relay server.
///
/// Handles the complete application lifecycle including:
/// 1. Command-line argument parsing
/// 2. Configuration loading and validation
/// 3. Logging system initialization
/// 4. Application creation and execution
/// 5. Error handling and cleanup
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments first
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();

    // Setup logging before anything else
    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    // Create and run application
    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

// Re-export main types for potential library usage
pub use config::{LoggingSettings, ServerSettings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let server_config = config
            .to_server_config()
            .expect("Default config should convert to ServerConfig");
        assert_eq!(server_config.max_connections, 1000);
        assert_eq!(server_config.connection_timeout, 60);
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs {
            config_path: PathBuf::from("test.toml"),
            bind_address: Some("127.0.0.1:9000".to_string()),
            upstream_address: Some("127.0.0.1:9100".to_string()),
            log_level: Some("debug".to_string()),
            json_logs: true,
        };

        assert_eq!(args.config_path, PathBuf::from("test.toml"));
        assert_eq!(args.bind_address, Some("127.0.0.1:9000".to_string()));
        assert_eq!(args.upstream_address, Some("127.0.0.1:9100".to_string()));
        assert_eq!(args.log_level, Some("debug".to_string()));
        assert!(args.json_logs);
    }
}
