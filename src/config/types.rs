//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::altcheck::AltCheckConfig;
use super::providers::ProvidersConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listener and metrics settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Alt-check policy.
    pub altcheck: AltCheckConfig,
    /// Reputation providers.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bridge listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the game-server bridge connects to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Prometheus metrics HTTP port (default: 9091, 0 disables).
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_port: None,
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7780))
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite player database.
    #[serde(default = "default_database_path")]
    pub path: String,
    /// Upsert connecting players into the store. Off when another process
    /// owns the player table.
    #[serde(default)]
    pub record_connections: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            record_connections: false,
        }
    }
}

fn default_database_path() -> String {
    "players.db".to_string()
}

pub(super) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
listen = "0.0.0.0:7000"
metrics_port = 0

[database]
path = "/tmp/players.db"
record_connections = true

[altcheck]
channel_id = "667741905228136459"

[providers.battlemetrics]
api_key = "secret"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.listen.port(), 7000);
        assert_eq!(config.server.metrics_port, Some(0));
        assert!(config.database.record_connections);
        assert_eq!(config.altcheck.channel_id, "667741905228136459");
        assert_eq!(config.providers.battlemetrics.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/altwatch.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_defaults_apply() {
        let config: Config = toml::from_str("[altcheck]\nchannel_id = \"1\"\n").unwrap();
        assert_eq!(config.server.listen, default_listen());
        assert_eq!(config.database.path, "players.db");
        assert!(!config.database.record_connections);
        assert!(config.providers.battlemetrics.enabled);
        assert!(config.providers.community_ban_list.enabled);
    }
}
