//! Configuration management for the Tactix server binary.
//!
//! Handles loading, validation, and conversion of server configuration from
//! TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use tactix_server::{ServerConfig, MAX_GAMES_LISTED};

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
///
/// Controls network binding and the fixed capacities of the client and game
/// tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Listen backlog for the accept socket
    #[serde(default = "default_backlog")]
    pub backlog: u32,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Maximum number of concurrent game sessions
    #[serde(default = "default_max_games")]
    pub max_games: usize,
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter
    pub level: String,
    /// JSON formatting
    #[serde(default)]
    pub json_format: bool,
    /// Log to file in addition to stdout
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_backlog() -> u32 {
    64
}

fn default_max_clients() -> usize {
    64
}

fn default_max_games() -> usize {
    32
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "127.0.0.1:8080".to_string(),
                backlog: default_backlog(),
                max_clients: default_max_clients(),
                max_games: default_max_games(),
            },
            logging: LoggingSettings::default(),
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
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts the application configuration into the server core's
    /// configuration type.
    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            backlog: self.server.backlog,
            max_clients: self.server.max_clients,
            max_games: self.server.max_games,
        })
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self
            .server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.server.max_clients == 0 {
            return Err("max_clients must be at least 1".to_string());
        }
        if self.server.max_games == 0 {
            return Err("max_games must be at least 1".to_string());
        }
        // One list-games response must be able to carry every waiting
        // session; more slots than that would silently hide games.
        if self.server.max_games > MAX_GAMES_LISTED {
            return Err(format!(
                "max_games must be at most {MAX_GAMES_LISTED} (the capacity of one game list)"
            ));
        }
        if self.server.backlog == 0 {
            return Err("backlog must be at least 1".to_string());
        }

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
    use tempfile::NamedTempFile;
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.server.backlog, 64);
        assert_eq!(config.server.max_clients, 64);
        assert_eq!(config.server.max_games, 32);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.json_format, false);
        assert!(config.logging.file_path.is_none());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conversion_to_server_config() {
        let config = AppConfig::default();
        let server_config = config.to_server_config().unwrap();
        assert_eq!(server_config.bind_address.port(), 8080);
        assert_eq!(server_config.backlog, 64);
        assert_eq!(server_config.max_clients, 64);
        assert_eq!(server_config.max_games, 32);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.bind_address = "invalid".to_string();
        assert!(config.validate().is_err());

        config.server.bind_address = "127.0.0.1:8080".to_string();
        config.server.max_clients = 0;
        assert!(config.validate().is_err());

        config.server.max_clients = 64;
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_games_is_bounded_by_the_game_list_capacity() {
        let mut config = AppConfig::default();

        config.server.max_games = MAX_GAMES_LISTED;
        assert!(config.validate().is_ok());

        config.server.max_games = MAX_GAMES_LISTED + 1;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");

        // The file was created and loads back identically.
        assert!(path.exists());
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.server.max_clients, config.server.max_clients);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[server]
bind_address = "0.0.0.0:3000"
backlog = 128
max_clients = 100
max_games = 50

[logging]
level = "debug"
json_format = true
file_path = "/tmp/tactix.log"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.backlog, 128);
        assert_eq!(config.server.max_clients, 100);
        assert_eq!(config.server.max_games, 50);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.json_format, true);
        assert_eq!(config.logging.file_path, Some("/tmp/tactix.log".to_string()));
    }

    #[tokio::test]
    async fn test_missing_optional_keys_fall_back_to_defaults() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:9000"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.backlog, 64);
        assert_eq!(config.server.max_clients, 64);
        assert_eq!(config.server.max_games, 32);
        assert_eq!(config.logging.level, "info");
    }
}
