use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::MessageBounds;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret used to verify bearer tokens
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_message_min_len")]
    pub message_min_len: usize,
    #[serde(default = "default_message_max_len")]
    pub message_max_len: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            message_min_len: default_message_min_len(),
            message_max_len: default_message_max_len(),
        }
    }
}

impl MatchingSettings {
    pub fn message_bounds(&self) -> MessageBounds {
        MessageBounds {
            min_len: self.message_min_len,
            max_len: self.message_max_len,
        }
    }
}

fn default_message_min_len() -> usize { 5 }
fn default_message_max_len() -> usize { 120 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with CATS__)
    /// 4. DATABASE_URL, JWT_SECRET, LOG_LEVEL and LOG_FORMAT
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., CATS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CATS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".to_string()));
        }
        let bounds = self.matching.message_bounds();
        if bounds.min_len == 0 || bounds.min_len > bounds.max_len {
            return Err(ConfigError::Message(format!(
                "invalid message bounds {}..={}",
                bounds.min_len, bounds.max_len
            )));
        }
        Ok(())
    }
}

/// Apply the well-known unprefixed variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_bounds() {
        let bounds = MatchingSettings::default().message_bounds();
        assert_eq!(bounds.min_len, 5);
        assert_eq!(bounds.max_len, 120);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_settings_from_toml() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/cats"

            [auth]
            jwt_secret = "secret"

            [matching]
            message_max_len = 200
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.matching.message_min_len, 5);
        assert_eq!(settings.matching.message_max_len, 200);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let settings = Settings {
            server: ServerSettings { host: "0.0.0.0".into(), port: 8080, workers: None },
            database: DatabaseSettings {
                url: String::new(),
                max_connections: None,
                min_connections: None,
                acquire_timeout_secs: None,
                idle_timeout_secs: None,
            },
            auth: AuthSettings { jwt_secret: String::new() },
            matching: MatchingSettings::default(),
            logging: LoggingSettings::default(),
        };

        assert!(settings.validate().is_err());
    }
}
