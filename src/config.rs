//! Configuration management for the Book Tracker server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Log levels accepted by `logging.level`
pub const LOG_LEVELS: [&str; 3] = ["debug", "info", "error"];

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file
    pub path: String,
    pub max_connections: u32,
    /// Insert sample books when the table is empty
    pub seed: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = AppConfig::default();

        let config = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.path", defaults.database.path)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.seed", defaults.database.seed)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BOOKTRACKER_SERVER__PORT=9000, BOOKTRACKER_DATABASE__PATH=...
            .add_source(
                Environment::with_prefix("BOOKTRACKER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Flat variables kept for compatibility with existing deployments
            .set_override_option(
                "server.port",
                env::var("PORT")
                    .ok()
                    .map(|p| p.trim_start_matches(':').to_string()),
            )?
            .set_override_option("database.path", env::var("DB_PATH").ok())?
            .set_override_option("logging.level", env::var("LOG_LEVEL").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Message("database.path cannot be empty".into()));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Message(format!(
                "logging.level must be debug, info, or error, got: {}",
                self.logging.level
            )));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Message(format!(
                "logging.format must be pretty or json, got: {}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8006,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./booktracker.db".to_string(),
            max_connections: 5,
            seed: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
