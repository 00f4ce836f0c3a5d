//! Main application logic and lifecycle management.
//!
//! This module contains the core `Application` struct that orchestrates
//! relay startup, running, and graceful shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent},
};
use relay_server::RelayServer;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application struct for the worldgate relay.
///
/// Manages the complete lifecycle of the relay, including configuration
/// loading, server initialization, and graceful shutdown handling.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Relay server instance
    server: Arc<RelayServer>,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// Loads configuration, applies CLI overrides, validates settings, and
    /// initializes the relay server.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Initialize the relay server with the configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(upstream_address) = args.upstream_address {
            config.server.upstream_address = upstream_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let server_config = config.to_server_config()?;
        let server = Arc::new(RelayServer::new(server_config));

        info!(
            "📂 Config: {} | Upstream: {}",
            args.config_path.display(),
            config.server.upstream_address
        );

        Ok(Self { config, server })
    }

    /// Runs the application until a shutdown signal arrives.
    ///
    /// Starts the relay in a background task, waits for SIGINT/SIGTERM,
    /// then asks the server to stop its accept loops and waits (bounded)
    /// for the task to finish. A second signal skips the graceful path.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Worldgate Relay Application");
        self.log_configuration_summary();

        let server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move {
                match server.start().await {
                    Ok(()) => {
                        info!("✅ Server completed successfully");
                    }
                    Err(e) => {
                        error!("❌ Server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        info!("✅ Worldgate Relay is now running!");
        info!(
            "🎮 Ready to accept connections on {}",
            self.config.server.bind_address
        );
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        wait_for_shutdown_signal().await?;

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        self.server.shutdown().await?;

        info!("⏳ Waiting for server task to complete gracefully...");
        if let Err(e) =
            tokio::time::timeout(tokio::time::Duration::from_secs(8), server_handle).await
        {
            warn!(
                "⏰ Server task did not complete within timeout, proceeding with cleanup: {:?}",
                e
            );
        } else {
            info!("✅ Server task completed gracefully");
        }

        // Give time for connection cleanup
        info!("⏳ Waiting for connections to close...");
        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;

        info!("✅ Worldgate Relay shutdown complete");

        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  🎯 Upstream: {}", self.config.server.upstream_address);
        info!(
            "  👥 Max connections: {}",
            self.config.server.max_connections
        );
        info!(
            "  ⏱️ Connection timeout: {}s",
            self.config.server.connection_timeout
        );
        info!(
            "  🧵 SO_REUSEPORT acceptors: {}",
            self.config.server.use_reuse_port
        );
    }
}
