//! Configuration management for the worldgate relay server.
//!
//! This module handles loading, validation, and conversion of server
//! configuration from TOML files and command-line arguments.

use relay_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Default for connection_timeout
pub fn default_connection_timeout() -> u64 {
    60
}

/// Default for max_connections
fn default_max_connections() -> usize {
    1000
}

/// Application configuration loaded from TOML file.
///
/// This is the main configuration structure that encompasses all relay
/// settings including networking, the upstream link, and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
///
/// Controls network binding, the upstream address, connection limits, and
/// timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the client-facing listener to
    pub bind_address: String,
    /// Address of the authoritative upstream game-logic process
    pub upstream_address: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    /// Whether to use SO_REUSEPORT for multi-threaded accept loops (Linux only)
    #[serde(default)]
    pub use_reuse_port: bool,
}

/// Logging system configuration.
///
/// Controls log output format, levels, and destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
    /// Optional file path for log output (None means stdout only)
    pub file_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "127.0.0.1:8080".to_string(),
                upstream_address: "127.0.0.1:9000".to_string(),
                max_connections: 1000,
                connection_timeout: 60,
                use_reuse_port: false,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
                file_path: None,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts the application configuration to a relay server
    /// configuration.
    ///
    /// This method translates the TOML-based configuration into the types
    /// expected by the relay server core.
    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            upstream_address: self.server.upstream_address.parse()?,
            max_connections: self.server.max_connections,
            connection_timeout: self.server.connection_timeout,
            use_reuse_port: self.server.use_reuse_port,
        })
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks network addresses, connection limits, and logging settings
    /// for validity.
    pub fn validate(&self) -> Result<(), String> {
        // Validate bind address
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        // Validate upstream address
        if self
            .server
            .upstream_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(format!(
                "Invalid upstream address: {}",
                &self.server.upstream_address
            ));
        }

        if self.server.bind_address == self.server.upstream_address {
            return Err("Bind and upstream addresses must differ".to_string());
        }

        if self.server.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.server.upstream_address, "127.0.0.1:9000");
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.server.connection_timeout, 60);
        assert_eq!(config.server.use_reuse_port, false);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.json_format, false);
        assert!(config.logging.file_path.is_none());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.bind_address = "invalid".to_string();
        assert!(config.validate().is_err());

        config.server.bind_address = "127.0.0.1:8080".to_string();
        config.server.upstream_address = "127.0.0.1:8080".to_string();
        assert!(config.validate().is_err());

        config.server.upstream_address = "127.0.0.1:9000".to_string();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        config.server.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_server_config() {
        let config = AppConfig::default();
        let server_config = config
            .to_server_config()
            .expect("Default config should convert to ServerConfig");
        assert_eq!(server_config.max_connections, 1000);
        assert_eq!(server_config.connection_timeout, 60);
        assert_eq!(
            server_config.upstream_address,
            "127.0.0.1:9000".parse().unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_from_file_roundtrip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.bind_address = "0.0.0.0:7777".to_string();
        config.server.use_reuse_port = true;
        let toml_content =
            toml::to_string_pretty(&config).expect("Failed to serialize config to TOML");
        tokio::fs::write(&path, toml_content)
            .await
            .expect("Failed to write config file");

        let loaded = AppConfig::load_from_file(&path)
            .await
            .expect("Failed to load config file");
        assert_eq!(loaded.server.bind_address, "0.0.0.0:7777");
        assert!(loaded.server.use_reuse_port);
    }

    #[tokio::test]
    async fn test_load_creates_default_when_missing() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing.toml");

        let loaded = AppConfig::load_from_file(&path)
            .await
            .expect("Missing file should yield defaults");
        assert_eq!(loaded.server.bind_address, "127.0.0.1:8080");
        assert!(path.exists());
    }
}
